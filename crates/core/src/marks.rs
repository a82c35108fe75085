// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Small relational records: read positions, favorites, pins, thread
//! subscriptions.

use crate::{AgentId, MessageId, ThreadId};
use serde::{Deserialize, Serialize};

/// Read-position marker: `agent` has read `home` up to `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadTo {
    pub agent: AgentId,
    /// `"room"` or a thread GUID.
    pub home: String,
    pub message: MessageId,
    pub at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fave {
    pub agent: AgentId,
    pub message: MessageId,
    pub at: i64,
}

/// A message pinned within a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    pub thread: ThreadId,
    pub message: MessageId,
    pub by: AgentId,
    pub at: i64,
}

/// Explicit thread subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub agent: AgentId,
    pub thread: ThreadId,
    pub at: i64,
}
