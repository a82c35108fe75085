// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wake-condition record: a persistent predicate that nominates an agent
//! for spawn when satisfied.

use crate::{AgentId, ThreadId, WakeId};
use serde::{Deserialize, Serialize};

/// Floor for prompt-type polling.
pub const MIN_POLL_INTERVAL_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WakeType {
    /// Any new message whose author is in `on_agents`
    OnMention,
    /// Wall-clock reaches `expires_at`
    After,
    /// Pre-compiled regex matches a new message body
    Pattern,
    /// LLM evaluator polled every `poll_interval_ms`
    Prompt,
}

impl std::fmt::Display for WakeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WakeType::OnMention => write!(f, "on_mention"),
            WakeType::After => write!(f, "after"),
            WakeType::Pattern => write!(f, "pattern"),
            WakeType::Prompt => write!(f, "prompt"),
        }
    }
}

/// What happens to a condition after it triggers or its agent leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PersistMode {
    /// Cleared after first trigger
    #[default]
    None,
    /// Retained across triggers
    Persist,
    /// Retained, auto-cleared on the agent's next `bye`
    PersistUntilBye,
    /// Paused on `bye`, resumed on `back`
    PersistRestoreOnBack,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WakeCondition {
    pub guid: WakeId,
    /// Whom to wake.
    pub agent_id: AgentId,
    pub set_by: AgentId,
    #[serde(rename = "type")]
    pub wake_type: WakeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Source-author filter for `on_mention`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_agents: Vec<AgentId>,
    /// Scope to one thread; unset means all threads except `meta/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_thread: Option<ThreadId>,
    #[serde(default)]
    pub after_ms: u64,
    /// Run the LLM router on a pattern match before spawning.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub use_router: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_text: Option<String>,
    #[serde(default)]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub last_polled_at: i64,
    #[serde(default)]
    pub persist_mode: PersistMode,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub paused: bool,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl WakeCondition {
    /// Effective poll interval, clamped to the 60 s floor.
    pub fn poll_interval_ms(&self) -> u64 {
        self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS)
    }
}

#[cfg(test)]
#[path = "wake_tests.rs"]
mod tests;
