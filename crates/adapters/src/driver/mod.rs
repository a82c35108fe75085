// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Driver process adapter.
//!
//! The daemon launches external LLM driver executables (claude, codex,
//! …) through this trait. Sessions are detached into their own process
//! group so the launching process may exit; the daemon supervises exits
//! via `try_wait`.

pub mod fake;
mod process;

pub use process::ProcessDriverAdapter;

use fray_core::{PromptDelivery, SessionId};
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable names of the spawn contract.
pub const ENV_AGENT_ID: &str = "FRAY_AGENT_ID";
pub const ENV_TRIGGER_HOME: &str = "FRAY_TRIGGER_HOME";
pub const ENV_JOB_ID: &str = "FRAY_JOB_ID";
pub const ENV_JOB_IDX: &str = "FRAY_JOB_IDX";

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to launch '{driver}': {message}")]
    Launch { driver: String, message: String },

    #[error("unknown session {0}")]
    UnknownSession(SessionId),

    #[error("signal failed: {0}")]
    Signal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything needed to start one driver session.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub agent_id: String,
    /// Driver executable name or path.
    pub driver: String,
    /// Extra argv before the prompt.
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub prompt: String,
    pub prompt_delivery: PromptDelivery,
    pub cwd: Option<PathBuf>,
    /// Home of the triggering message, exported as `FRAY_TRIGGER_HOME`.
    pub trigger_home: String,
    /// Job-worker context, exported as `FRAY_JOB_ID`/`FRAY_JOB_IDX`.
    pub job: Option<(String, u32)>,
    /// Driver-specific session id to resume, exported via the driver's
    /// resume variable when present.
    pub resume_session: Option<String>,
}

impl LaunchSpec {
    pub fn new(agent_id: impl Into<String>, driver: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            driver: driver.into(),
            args: Vec::new(),
            env: Vec::new(),
            prompt: String::new(),
            prompt_delivery: PromptDelivery::Stdin,
            cwd: None,
            trigger_home: "room".to_string(),
            job: None,
            resume_session: None,
        }
    }
}

/// A launched session, identified by the generated session id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverHandle {
    pub session_id: SessionId,
    pub pid: Option<u32>,
}

pub trait DriverAdapter: Send + Sync {
    /// Start a detached driver process. Returns after the process is
    /// spawned, not after it finishes.
    fn launch(&self, spec: &LaunchSpec) -> Result<DriverHandle, DriverError>;

    /// Graceful stop request (SIGTERM-equivalent).
    fn signal_stop(&self, handle: &DriverHandle) -> Result<(), DriverError>;

    /// Hard kill.
    fn kill(&self, handle: &DriverHandle) -> Result<(), DriverError>;

    /// Exit code if the session has finished, `None` while running.
    fn try_wait(&self, handle: &DriverHandle) -> Result<Option<i32>, DriverError>;
}
