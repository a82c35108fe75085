// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread record.

use crate::{AgentId, MessageId, ThreadId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    #[default]
    Open,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThreadKind {
    #[default]
    Standard,
    Knowledge,
    System,
}

/// A named conversation container.
///
/// `name` is a lowercase slash-path. Paths like `meta/<agent>/notes` are
/// conventions only; the data model does not interpret them, except that
/// wake evaluation excludes `meta/` threads from its default scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub guid: ThreadId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_thread: Option<ThreadId>,
    #[serde(default)]
    pub status: ThreadStatus,
    #[serde(default, rename = "type")]
    pub kind: ThreadKind,
    pub created_at: i64,
    pub created_by: AgentId,
    /// When set, only the owner and human posts trigger spawns for other
    /// agents in this thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_agent: Option<AgentId>,
    /// TL;DR pointer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_message_guid: Option<MessageId>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub anchor_hidden: bool,
    #[serde(default)]
    pub last_activity_at: i64,
}

impl Thread {
    pub fn new(guid: ThreadId, name: impl Into<String>, created_at: i64, created_by: AgentId) -> Self {
        Self {
            guid,
            name: name.into(),
            parent_thread: None,
            status: ThreadStatus::Open,
            kind: ThreadKind::Standard,
            created_at,
            created_by,
            owner_agent: None,
            anchor_message_guid: None,
            anchor_hidden: false,
            last_activity_at: created_at,
        }
    }

    /// Whether the thread name sits under the `meta/` handoff space.
    pub fn is_meta(&self) -> bool {
        self.name == "meta" || self.name.starts_with("meta/")
    }
}

#[cfg(test)]
#[path = "thread_tests.rs"]
mod tests;
