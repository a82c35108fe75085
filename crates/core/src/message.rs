// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message record and reaction marks.

use crate::{AgentId, MachineId, MessageId, SessionId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The shared room home. Every other home is a thread GUID.
pub const HOME_ROOM: &str = "room";

/// Who or what authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    User,
    Agent,
    /// System-generated lifecycle notice (join/leave, job close, …)
    Event,
    /// Surfaced content from an external source
    Surface,
    /// Sticky deletion placeholder; authored by `system`
    Tombstone,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageKind::User => write!(f, "user"),
            MessageKind::Agent => write!(f, "agent"),
            MessageKind::Event => write!(f, "event"),
            MessageKind::Surface => write!(f, "surface"),
            MessageKind::Tombstone => write!(f, "tombstone"),
        }
    }
}

/// One agent's reaction with an emoji, at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionMark {
    pub agent: AgentId,
    pub reacted_at: i64,
}

/// A message in the room or a thread.
///
/// `home` is either [`HOME_ROOM`] or an existing thread GUID. `reply_to`,
/// when set, points to a message with the same home. A message is either
/// edited (monotonic `edit_count`) or tombstoned, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub ts: i64,
    pub home: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    /// Author agent id, no leading `@`.
    pub from_agent: AgentId,
    pub body: String,
    /// Resolved recipient agent ids computed at post time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<String>,
    /// Spawn-with-context syntax: recipient agent → prior session id.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fork_sessions: HashMap<String, String>,
    /// Session that posted this message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    /// emoji → reacting agents (set-valued per agent).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub reactions: HashMap<String, Vec<ReactionMark>>,
    #[serde(default, rename = "type")]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_message_guid: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub edited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<i64>,
    #[serde(default)]
    pub edit_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<i64>,
    /// Machine whose log introduced this row.
    #[serde(default)]
    pub origin: MachineId,
}

impl Message {
    /// Minimal constructor; derived fields start empty.
    pub fn new(
        id: MessageId,
        ts: i64,
        home: impl Into<String>,
        from_agent: AgentId,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id,
            ts,
            home: home.into(),
            channel_id: None,
            from_agent,
            body: body.into(),
            mentions: Vec::new(),
            fork_sessions: HashMap::new(),
            session_id: None,
            reactions: HashMap::new(),
            kind: MessageKind::User,
            reply_to: None,
            quote_message_guid: None,
            references: Vec::new(),
            edited: false,
            edited_at: None,
            edit_count: 0,
            archived_at: None,
            origin: MachineId::default(),
        }
    }

    pub fn is_tombstone(&self) -> bool {
        self.kind == MessageKind::Tombstone
    }

    /// Whether `agent` already reacted with `emoji`.
    pub fn has_reaction(&self, emoji: &str, agent: &AgentId) -> bool {
        self.reactions
            .get(emoji)
            .is_some_and(|marks| marks.iter().any(|m| &m.agent == agent))
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
