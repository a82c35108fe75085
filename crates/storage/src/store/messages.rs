// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message reads and write-path validation.

use super::{json_map, json_vec, Store};
use crate::error::StorageError;
use fray_core::{AgentId, Message, MessageId, MessageKind, ReactionMark, SessionId, HOME_ROOM};
use rusqlite::{params, OptionalExtension, Row};
use std::collections::HashMap;

/// Minimum prefix length for message/thread reference resolution.
pub(crate) const MIN_PREFIX: usize = 4;

const MESSAGE_COLS: &str = "id, ts, home, channel_id, from_agent, body, kind, reply_to, \
     quote_message_guid, session_id, mentions, fork_sessions, refs, edited, edited_at, \
     edit_count, archived_at, origin";

/// Draft of a message before validation assigns derived fields.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub home: String,
    pub from_agent: AgentId,
    pub body: String,
    pub kind: MessageKind,
    /// Raw reply reference; full id or unique prefix.
    pub reply_to: Option<String>,
    pub mentions: Vec<String>,
    pub fork_sessions: HashMap<String, String>,
    pub session_id: Option<SessionId>,
    pub quote_message_guid: Option<MessageId>,
}

impl NewMessage {
    pub fn in_home(home: impl Into<String>, from_agent: AgentId, body: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            from_agent,
            body: body.into(),
            kind: MessageKind::User,
            reply_to: None,
            mentions: Vec::new(),
            fork_sessions: HashMap::new(),
            session_id: None,
            quote_message_guid: None,
        }
    }
}

/// Compound pagination cursor; iteration order is `(ts, id)` ascending so
/// ties are stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCursor {
    pub ts: i64,
    pub id: String,
}

impl MessageCursor {
    pub fn of(message: &Message) -> Self {
        Self {
            ts: message.ts,
            id: message.id.as_str().to_string(),
        }
    }
}

pub(crate) fn kind_from_str(s: &str) -> MessageKind {
    match s {
        "agent" => MessageKind::Agent,
        "event" => MessageKind::Event,
        "surface" => MessageKind::Surface,
        "tombstone" => MessageKind::Tombstone,
        _ => MessageKind::User,
    }
}

pub(crate) fn row_to_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: MessageId::new(row.get::<_, String>(0)?),
        ts: row.get(1)?,
        home: row.get(2)?,
        channel_id: row.get(3)?,
        from_agent: AgentId::new(row.get::<_, String>(4)?),
        body: row.get(5)?,
        kind: kind_from_str(&row.get::<_, String>(6)?),
        reply_to: row.get::<_, Option<String>>(7)?.map(MessageId::new),
        quote_message_guid: row.get::<_, Option<String>>(8)?.map(MessageId::new),
        session_id: row.get::<_, Option<String>>(9)?.map(SessionId::new),
        mentions: json_vec(row.get(10)?),
        fork_sessions: json_map(row.get(11)?),
        references: json_vec(row.get(12)?),
        edited: row.get(13)?,
        edited_at: row.get(14)?,
        edit_count: row.get(15)?,
        archived_at: row.get(16)?,
        origin: fray_core::MachineId::new(row.get::<_, String>(17)?),
        reactions: HashMap::new(),
    })
}

impl Store {
    /// Fetch one message by exact id, with reactions hydrated.
    pub fn get_message(&self, id: &str) -> Result<Message, StorageError> {
        self.try_get_message(id)?
            .ok_or_else(|| StorageError::not_found("message", id))
    }

    pub fn try_get_message(&self, id: &str) -> Result<Option<Message>, StorageError> {
        let sql = format!("SELECT {MESSAGE_COLS} FROM messages WHERE id = ?1");
        let message = self
            .conn()
            .query_row(&sql, params![id], row_to_message)
            .optional()?;
        match message {
            Some(mut m) => {
                self.hydrate_reactions(&mut m)?;
                Ok(Some(m))
            }
            None => Ok(None),
        }
    }

    /// Resolve a full id or a unique prefix (≥ 4 chars) to a message id.
    pub fn resolve_message(&self, reference: &str) -> Result<MessageId, StorageError> {
        let exists: Option<String> = self
            .conn()
            .query_row(
                "SELECT id FROM messages WHERE id = ?1",
                params![reference],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = exists {
            return Ok(MessageId::new(id));
        }

        if reference.len() < MIN_PREFIX {
            return Err(StorageError::not_found("message", reference));
        }

        let mut stmt = self
            .conn()
            .prepare("SELECT id FROM messages WHERE id LIKE ?1 || '%' ORDER BY id LIMIT 10")?;
        let candidates: Vec<String> = stmt
            .query_map(params![reference], |row| row.get(0))?
            .collect::<Result<_, _>>()?;

        match candidates.len() {
            0 => Err(StorageError::not_found("message", reference)),
            1 => Ok(MessageId::new(candidates.into_iter().next().unwrap_or_default())),
            _ => Err(StorageError::ambiguous("message", reference, candidates)),
        }
    }

    /// Messages in a home ordered by `(ts, id)`, starting after the cursor.
    pub fn list_messages(
        &self,
        home: &str,
        limit: usize,
        after: Option<&MessageCursor>,
    ) -> Result<Vec<Message>, StorageError> {
        let (after_ts, after_id) = after.map_or((i64::MIN, ""), |c| (c.ts, c.id.as_str()));
        let sql = format!(
            "SELECT {MESSAGE_COLS} FROM messages \
             WHERE home = ?1 AND (ts > ?2 OR (ts = ?2 AND id > ?3)) \
             ORDER BY ts, id LIMIT ?4"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let mut messages: Vec<Message> = stmt
            .query_map(
                params![home, after_ts, after_id, limit as i64],
                row_to_message,
            )?
            .collect::<Result<_, _>>()?;
        for message in &mut messages {
            self.hydrate_reactions(message)?;
        }
        Ok(messages)
    }

    /// Every message in a home, ordered by `(ts, id)`, no paging. Prune
    /// operates over this listing.
    pub fn home_messages(&self, home: &str) -> Result<Vec<Message>, StorageError> {
        let sql = format!(
            "SELECT {MESSAGE_COLS} FROM messages WHERE home = ?1 ORDER BY ts, id"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let mut messages: Vec<Message> = stmt
            .query_map(params![home], row_to_message)?
            .collect::<Result<_, _>>()?;
        for message in &mut messages {
            self.hydrate_reactions(message)?;
        }
        Ok(messages)
    }

    /// Messages across every home after the cursor, ordered by `(ts,
    /// id)`. The daemon advances through the log with this.
    pub fn messages_after(
        &self,
        after: Option<&MessageCursor>,
        limit: usize,
    ) -> Result<Vec<Message>, StorageError> {
        let (after_ts, after_id) = after.map_or((i64::MIN, ""), |c| (c.ts, c.id.as_str()));
        let sql = format!(
            "SELECT {MESSAGE_COLS} FROM messages \
             WHERE ts > ?1 OR (ts = ?1 AND id > ?2) \
             ORDER BY ts, id LIMIT ?3"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let mut messages: Vec<Message> = stmt
            .query_map(params![after_ts, after_id, limit as i64], row_to_message)?
            .collect::<Result<_, _>>()?;
        for message in &mut messages {
            self.hydrate_reactions(message)?;
        }
        Ok(messages)
    }

    /// Authors up the reply chain of `message`, nearest parent first,
    /// bounded to `depth`. A visited set breaks cycles formed by
    /// cross-machine imports.
    pub fn reply_chain_authors(
        &self,
        message: &Message,
        depth: usize,
    ) -> Result<Vec<String>, StorageError> {
        let mut authors = Vec::new();
        let mut visited = std::collections::HashSet::new();
        let mut current = message.reply_to.clone();
        while let Some(id) = current {
            if authors.len() >= depth || !visited.insert(id.clone()) {
                break;
            }
            match self.try_get_message(id.as_str())? {
                Some(parent) => {
                    authors.push(parent.from_agent.to_string());
                    current = parent.reply_to;
                }
                None => break,
            }
        }
        Ok(authors)
    }

    /// Every message in the cache, ordered by `(ts, id)`. Rebuild
    /// determinism is asserted over this listing.
    pub fn list_all_messages(&self) -> Result<Vec<Message>, StorageError> {
        let sql = format!("SELECT {MESSAGE_COLS} FROM messages ORDER BY ts, id");
        let mut stmt = self.conn().prepare(&sql)?;
        let mut messages: Vec<Message> = stmt
            .query_map([], row_to_message)?
            .collect::<Result<_, _>>()?;
        for message in &mut messages {
            self.hydrate_reactions(message)?;
        }
        Ok(messages)
    }

    pub fn is_tombstoned(&self, id: &str) -> Result<bool, StorageError> {
        let found: Option<i64> = self
            .conn()
            .query_row(
                "SELECT 1 FROM tombstones WHERE message = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Validate a draft: the home must be `room` or an existing thread, and
    /// `reply_to` must resolve to a message in the same home.
    ///
    /// Returns the resolved reply target, if any.
    pub fn validate_new_message(
        &self,
        new: &NewMessage,
    ) -> Result<Option<MessageId>, StorageError> {
        if new.home != HOME_ROOM {
            let exists: Option<String> = self
                .conn()
                .query_row(
                    "SELECT guid FROM threads WHERE guid = ?1",
                    params![new.home],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                return Err(StorageError::InvariantViolation(format!(
                    "home '{}' refers to no thread",
                    new.home
                )));
            }
        }

        let Some(reference) = &new.reply_to else {
            return Ok(None);
        };
        let reply_id = self.resolve_message(reference)?;
        let parent = self.get_message(reply_id.as_str())?;
        if parent.home != new.home {
            return Err(StorageError::InvariantViolation(format!(
                "reply target {} lives in '{}', not '{}'",
                reply_id, parent.home, new.home
            )));
        }
        Ok(Some(reply_id))
    }

    /// Validate an edit: target must exist, must not be a tombstone, and
    /// must be authored by `editor` unless the caller holds a trust
    /// capability.
    pub fn validate_edit(
        &self,
        id: &MessageId,
        editor: &AgentId,
        trusted: bool,
    ) -> Result<Message, StorageError> {
        if self.is_tombstoned(id.as_str())? {
            return Err(StorageError::InvariantViolation(format!(
                "message {id} is tombstoned"
            )));
        }
        let message = self.get_message(id.as_str())?;
        if message.is_tombstone() {
            return Err(StorageError::InvariantViolation(format!(
                "message {id} is a tombstone"
            )));
        }
        if !trusted && message.from_agent != *editor {
            return Err(StorageError::PermissionDenied(format!(
                "message {id} was authored by {}",
                message.from_agent
            )));
        }
        Ok(message)
    }

    pub(crate) fn hydrate_reactions(&self, message: &mut Message) -> Result<(), StorageError> {
        let mut stmt = self.conn().prepare(
            "SELECT emoji, agent, reacted_at FROM reactions WHERE message = ?1 \
             ORDER BY emoji, reacted_at, agent",
        )?;
        let rows = stmt.query_map(params![message.id.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;
        let mut reactions: HashMap<String, Vec<ReactionMark>> = HashMap::new();
        for row in rows {
            let (emoji, agent, reacted_at) = row?;
            reactions.entry(emoji).or_default().push(ReactionMark {
                agent: AgentId::new(agent),
                reacted_at,
            });
        }
        message.reactions = reactions;
        Ok(())
    }
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
