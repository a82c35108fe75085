// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake driver adapter for hermetic tests.

use super::{DriverAdapter, DriverError, DriverHandle, LaunchSpec};
use fray_core::SessionId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct FakeSession {
    spec: LaunchSpec,
    exit_code: Option<i32>,
    stop_signalled: bool,
    killed: bool,
}

/// Records launches and lets tests script exits.
#[derive(Clone, Default)]
pub struct FakeDriverAdapter {
    sessions: Arc<Mutex<HashMap<SessionId, FakeSession>>>,
    counter: Arc<AtomicU64>,
    /// When set, every launch fails with this message.
    fail_launches: Arc<Mutex<Option<String>>>,
}

impl FakeDriverAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent launches fail.
    pub fn fail_with(&self, message: &str) {
        *self.fail_launches.lock() = Some(message.to_string());
    }

    /// Specs of every launch, in order of session id allocation.
    pub fn launches(&self) -> Vec<LaunchSpec> {
        let sessions = self.sessions.lock();
        let mut entries: Vec<(&SessionId, &FakeSession)> = sessions.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(_, s)| s.spec.clone()).collect()
    }

    pub fn launch_count(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Simulate the session finishing with `exit_code`.
    pub fn complete(&self, session: &SessionId, exit_code: i32) {
        if let Some(entry) = self.sessions.lock().get_mut(session) {
            entry.exit_code = Some(exit_code);
        }
    }

    /// Most recently launched session id.
    pub fn last_session(&self) -> Option<SessionId> {
        let sessions = self.sessions.lock();
        sessions.keys().max().cloned()
    }

    pub fn was_stop_signalled(&self, session: &SessionId) -> bool {
        self.sessions
            .lock()
            .get(session)
            .is_some_and(|s| s.stop_signalled)
    }

    pub fn was_killed(&self, session: &SessionId) -> bool {
        self.sessions.lock().get(session).is_some_and(|s| s.killed)
    }
}

impl DriverAdapter for FakeDriverAdapter {
    fn launch(&self, spec: &LaunchSpec) -> Result<DriverHandle, DriverError> {
        if let Some(message) = self.fail_launches.lock().clone() {
            return Err(DriverError::Launch {
                driver: spec.driver.clone(),
                message,
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let session_id = SessionId::new(format!("fake-session-{n:06}"));
        self.sessions.lock().insert(
            session_id.clone(),
            FakeSession {
                spec: spec.clone(),
                exit_code: None,
                stop_signalled: false,
                killed: false,
            },
        );
        Ok(DriverHandle {
            session_id,
            pid: None,
        })
    }

    fn signal_stop(&self, handle: &DriverHandle) -> Result<(), DriverError> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(&handle.session_id)
            .ok_or_else(|| DriverError::UnknownSession(handle.session_id.clone()))?;
        session.stop_signalled = true;
        // A stopped fake session exits cleanly
        session.exit_code.get_or_insert(0);
        Ok(())
    }

    fn kill(&self, handle: &DriverHandle) -> Result<(), DriverError> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(&handle.session_id)
            .ok_or_else(|| DriverError::UnknownSession(handle.session_id.clone()))?;
        session.killed = true;
        session.exit_code = Some(137);
        Ok(())
    }

    fn try_wait(&self, handle: &DriverHandle) -> Result<Option<i32>, DriverError> {
        let sessions = self.sessions.lock();
        let session = sessions
            .get(&handle.session_id)
            .ok_or_else(|| DriverError::UnknownSession(handle.session_id.clone()))?;
        Ok(session.exit_code)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
