// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent record, presence states, and invoke configuration.

use crate::{AgentId, JobId, SessionId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Presence state of an agent as tracked by the daemon.
///
/// Legacy rows may carry an empty presence string; it deserializes to
/// `Offline`, which is also what spawn decisions treat it as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presence {
    #[default]
    Offline,
    Spawning,
    Active,
    /// In-flight LLM call (observability only)
    Prompting,
    Prompted,
    Idle,
    Error,
}

impl Presence {
    pub fn as_str(self) -> &'static str {
        match self {
            Presence::Offline => "offline",
            Presence::Spawning => "spawning",
            Presence::Active => "active",
            Presence::Prompting => "prompting",
            Presence::Prompted => "prompted",
            Presence::Idle => "idle",
            Presence::Error => "error",
        }
    }

    /// Whether a new mention may launch a session right now.
    pub fn is_launchable(self) -> bool {
        matches!(self, Presence::Offline | Presence::Idle)
    }

    /// Whether the agent currently holds (or is acquiring) a live session.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            Presence::Spawning
                | Presence::Active
                | Presence::Prompting
                | Presence::Prompted
                | Presence::Error
        )
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Presence {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Presence {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "" | "offline" => Ok(Presence::Offline),
            "spawning" => Ok(Presence::Spawning),
            "active" => Ok(Presence::Active),
            "prompting" => Ok(Presence::Prompting),
            "prompted" => Ok(Presence::Prompted),
            "idle" => Ok(Presence::Idle),
            "error" => Ok(Presence::Error),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &[
                    "offline", "spawning", "active", "prompting", "prompted", "idle", "error",
                ],
            )),
        }
    }
}

/// How the wake prompt reaches the driver process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromptDelivery {
    /// Pipe the prompt on stdin
    #[default]
    Stdin,
    /// Pass the prompt as a command-line argument
    Args,
}

/// Embedded driver configuration for a managed agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeConfig {
    /// Driver executable (e.g. `claude`, `codex`, an absolute path).
    pub driver: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub prompt_delivery: PromptDelivery,
    /// Extra argv passed before the prompt.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Bounds the spawning→active transition. 0 uses the daemon default.
    #[serde(default)]
    pub spawn_timeout_ms: u64,
    /// Done-detection inactivity bound. 0 disables.
    #[serde(default)]
    pub min_checkin_ms: u64,
    /// Hard runtime cap. 0 disables.
    #[serde(default)]
    pub max_runtime_ms: u64,
}

impl InvokeConfig {
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            model: None,
            prompt_delivery: PromptDelivery::Stdin,
            args: Vec::new(),
            spawn_timeout_ms: 0,
            min_checkin_ms: 0,
            max_runtime_ms: 0,
        }
    }
}

/// An agent registered in the project.
///
/// Humans are unmanaged (`managed=false`, no invoke config); managed agents
/// carry a driver and cycle through presence states indefinitely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub guid: String,
    /// Base name, lowercase ASCII; job workers carry a bracketed suffix
    /// (`dev[ab12-0]`).
    pub agent_id: AgentId,
    #[serde(default)]
    pub managed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoke: Option<InvokeConfig>,
    #[serde(default)]
    pub presence: Presence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub registered_at: i64,
    #[serde(default)]
    pub last_seen: i64,
    /// Set only by explicit `bye`, not by session exit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_at: Option<i64>,
    /// Last message id considered for wake decisions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mention_watermark: Option<String>,
    /// Reaction-processing watermark (unix seconds).
    #[serde(default)]
    pub reaction_watermark: i64,
    /// Last heartbeat, epoch milliseconds.
    #[serde(default)]
    pub last_heartbeat: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_idx: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_ephemeral: bool,
    #[serde(default)]
    pub last_known_input: u64,
    #[serde(default)]
    pub last_known_output: u64,
    #[serde(default)]
    pub tokens_updated_at: i64,
}

impl AgentRecord {
    pub fn new(guid: impl Into<String>, agent_id: AgentId, registered_at: i64) -> Self {
        Self {
            guid: guid.into(),
            agent_id,
            managed: false,
            invoke: None,
            presence: Presence::Offline,
            status: None,
            avatar: None,
            registered_at,
            last_seen: registered_at,
            left_at: None,
            mention_watermark: None,
            reaction_watermark: 0,
            last_heartbeat: 0,
            last_session_id: None,
            session_mode: None,
            job_id: None,
            job_idx: None,
            is_ephemeral: false,
            last_known_input: 0,
            last_known_output: 0,
            tokens_updated_at: 0,
        }
    }

    /// Whether the agent has said `bye` and not come `back`.
    pub fn is_away(&self) -> bool {
        self.left_at.is_some()
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
