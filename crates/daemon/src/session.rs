// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live session bookkeeping.
//!
//! One [`ActiveSession`] per driver child the daemon currently
//! supervises. All timing fields are epoch milliseconds from the
//! supervisor's clock.

use fray_adapters::DriverHandle;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub agent_id: String,
    pub handle: DriverHandle,
    pub launched_at_ms: u64,
    /// Deadline for the spawning→active transition.
    pub spawn_deadline_ms: u64,
    /// Inactivity bound; 0 disables done-detection.
    pub min_checkin_ms: u64,
    /// Hard runtime cap; 0 disables.
    pub max_runtime_ms: u64,
    /// The launch resumed a prior driver session.
    pub resumed: bool,
    /// Graceful stop sent at this time; hard kill after `T_kill`.
    pub stop_requested_at_ms: Option<u64>,
}

/// agent id → live session. One session per agent at a time.
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: HashMap<String, ActiveSession>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, session: ActiveSession) {
        self.sessions.insert(session.agent_id.clone(), session);
    }

    pub fn get(&self, agent_id: &str) -> Option<&ActiveSession> {
        self.sessions.get(agent_id)
    }

    pub fn get_mut(&mut self, agent_id: &str) -> Option<&mut ActiveSession> {
        self.sessions.get_mut(agent_id)
    }

    pub fn remove(&mut self, agent_id: &str) -> Option<ActiveSession> {
        self.sessions.remove(agent_id)
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.sessions.contains_key(agent_id)
    }

    /// Agent ids in deterministic order for the supervision sweep.
    pub fn agent_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
