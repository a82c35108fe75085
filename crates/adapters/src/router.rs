// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LLM router adapter.
//!
//! Routers are external executables under `.fray/llm/routers/`. The
//! contract: JSON `{"prompt": ..., "message": ...}` on stdin, JSON
//! `{"shouldWake": bool, "confidence": number}` on stdout, within a
//! short timeout. Output is parsed defensively; callers treat every
//! error as "spawn anyway".

#[cfg(any(test, feature = "test-support"))]
use parking_lot::Mutex;
use serde::Deserialize;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Hard deadline for one router call.
pub const ROUTER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("router '{0}' failed to start: {1}")]
    Spawn(String, String),

    #[error("router timed out after {0:?}")]
    Timeout(Duration),

    #[error("router exited with {0}")]
    Failed(i32),

    #[error("unparseable router output: {0}")]
    BadOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouterVerdict {
    pub should_wake: bool,
    pub confidence: f32,
}

pub trait RouterAdapter: Send + Sync {
    fn assess(&self, prompt: &str, message: &str) -> Result<RouterVerdict, RouterError>;
}

#[derive(Debug, Deserialize)]
struct WireVerdict {
    #[serde(rename = "shouldWake")]
    should_wake: bool,
    #[serde(default = "default_confidence")]
    confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

/// Runs the configured router executable.
pub struct ExecRouterAdapter {
    executable: PathBuf,
    timeout: Duration,
}

impl ExecRouterAdapter {
    pub fn new(executable: PathBuf) -> Self {
        Self {
            executable,
            timeout: ROUTER_TIMEOUT,
        }
    }

    pub fn with_timeout(executable: PathBuf, timeout: Duration) -> Self {
        Self {
            executable,
            timeout,
        }
    }
}

impl RouterAdapter for ExecRouterAdapter {
    fn assess(&self, prompt: &str, message: &str) -> Result<RouterVerdict, RouterError> {
        let mut child = Command::new(&self.executable)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                RouterError::Spawn(self.executable.display().to_string(), e.to_string())
            })?;

        let input = serde_json::json!({ "prompt": prompt, "message": message }).to_string();
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(input.as_bytes());
        }

        // Poll for completion; a hung router is killed at the deadline
        let started = Instant::now();
        loop {
            match child.try_wait()? {
                Some(status) if status.success() => break,
                Some(status) => return Err(RouterError::Failed(status.code().unwrap_or(-1))),
                None if started.elapsed() >= self.timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(RouterError::Timeout(self.timeout));
                }
                None => std::thread::sleep(Duration::from_millis(25)),
            }
        }

        let mut stdout = String::new();
        if let Some(mut out) = child.stdout.take() {
            use std::io::Read;
            let _ = out.read_to_string(&mut stdout);
        }

        let wire: WireVerdict = serde_json::from_str(stdout.trim())
            .map_err(|e| RouterError::BadOutput(format!("{e}: {stdout:.120}")))?;
        Ok(RouterVerdict {
            should_wake: wire.should_wake,
            confidence: wire.confidence.clamp(0.0, 1.0),
        })
    }
}

/// Scriptable router for tests.
#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
pub struct FakeRouterAdapter {
    responses: Mutex<Vec<Result<RouterVerdict, String>>>,
    pub calls: Mutex<Vec<(String, String)>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeRouterAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, should_wake: bool, confidence: f32) -> Self {
        self.responses.lock().push(Ok(RouterVerdict {
            should_wake,
            confidence,
        }));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.responses.lock().push(Err(message.to_string()));
        self
    }
}

#[cfg(any(test, feature = "test-support"))]
impl RouterAdapter for FakeRouterAdapter {
    fn assess(&self, prompt: &str, message: &str) -> Result<RouterVerdict, RouterError> {
        self.calls
            .lock()
            .push((prompt.to_string(), message.to_string()));
        let mut responses = self.responses.lock();
        if responses.is_empty() {
            return Ok(RouterVerdict {
                should_wake: true,
                confidence: 1.0,
            });
        }
        match responses.remove(0) {
            Ok(verdict) => Ok(verdict),
            Err(message) => Err(RouterError::BadOutput(message)),
        }
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
