// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-agent pending mention queues.
//!
//! While an agent is busy, further mentions accumulate here, FIFO and
//! deduplicated by message id. On clean session end the daemon drains
//! the queue and relaunches with the accumulated context.

use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMention {
    pub message_id: String,
    pub home: String,
    pub from_agent: String,
}

#[derive(Debug, Default)]
pub struct Debouncer {
    queues: HashMap<String, VecDeque<PendingMention>>,
    seen: HashMap<String, HashSet<String>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a mention for a busy agent. Duplicates by message id
    /// collapse; order is arrival order.
    pub fn push(&mut self, agent: &str, mention: PendingMention) -> bool {
        let seen = self.seen.entry(agent.to_string()).or_default();
        if !seen.insert(mention.message_id.clone()) {
            return false;
        }
        self.queues
            .entry(agent.to_string())
            .or_default()
            .push_back(mention);
        true
    }

    pub fn pending(&self, agent: &str) -> usize {
        self.queues.get(agent).map_or(0, VecDeque::len)
    }

    pub fn has_pending(&self, agent: &str) -> bool {
        self.pending(agent) > 0
    }

    /// Remove and return all pending mentions in arrival order.
    pub fn drain(&mut self, agent: &str) -> Vec<PendingMention> {
        self.seen.remove(agent);
        self.queues
            .remove(agent)
            .map(Vec::from)
            .unwrap_or_default()
    }

    /// Agents with at least one queued mention.
    pub fn agents_with_pending(&self) -> Vec<&str> {
        let mut agents: Vec<&str> = self
            .queues
            .iter()
            .filter(|(_, q)| !q.is_empty())
            .map(|(k, _)| k.as_str())
            .collect();
        agents.sort_unstable();
        agents
    }
}

#[cfg(test)]
#[path = "debounce_tests.rs"]
mod tests;
