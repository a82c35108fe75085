// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite cache over the JSONL logs.
//!
//! The cache is derived state: every mutation flows through
//! [`Store::apply_envelope`], the same fold rebuild uses, after the
//! corresponding envelope is durably appended. Invariants (home must
//! exist, tombstone edits rejected, …) are enforced by the validation
//! helpers here, not at call sites.

mod agents;
mod apply;
mod jobs;
mod marks;
mod messages;
mod questions;
mod threads;
mod wake;

pub use messages::{MessageCursor, NewMessage};
pub use threads::ThreadRef;

use crate::error::StorageError;
use rusqlite::Connection;
use std::path::Path;

/// Outcome of applying one envelope to the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Changed,
    /// A no-op (duplicate reaction, update to a missing row, tombstoned
    /// target). Writers use this to skip the JSONL append.
    Unchanged,
    /// The envelope introduced a GUID that already exists with different
    /// content. Recorded as an integrity incident, never auto-remediated.
    Collision(String),
}

const SCHEMA_VERSION: u32 = 1;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    ts INTEGER NOT NULL,
    home TEXT NOT NULL,
    channel_id TEXT,
    from_agent TEXT NOT NULL,
    body TEXT NOT NULL,
    kind TEXT NOT NULL DEFAULT 'user',
    reply_to TEXT,
    quote_message_guid TEXT,
    session_id TEXT,
    mentions TEXT NOT NULL DEFAULT '[]',
    fork_sessions TEXT NOT NULL DEFAULT '{}',
    refs TEXT NOT NULL DEFAULT '[]',
    edited INTEGER NOT NULL DEFAULT 0,
    edited_at INTEGER,
    edit_count INTEGER NOT NULL DEFAULT 0,
    archived_at INTEGER,
    origin TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_messages_home ON messages(home, ts, id);
CREATE INDEX IF NOT EXISTS idx_messages_reply ON messages(reply_to);

CREATE TABLE IF NOT EXISTS reactions (
    message TEXT NOT NULL,
    emoji TEXT NOT NULL,
    agent TEXT NOT NULL,
    reacted_at INTEGER NOT NULL,
    PRIMARY KEY (message, emoji, agent)
);

CREATE TABLE IF NOT EXISTS tombstones (
    message TEXT PRIMARY KEY,
    by_agent TEXT NOT NULL DEFAULT '',
    ts INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS threads (
    guid TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    parent_thread TEXT,
    status TEXT NOT NULL DEFAULT 'open',
    kind TEXT NOT NULL DEFAULT 'standard',
    created_at INTEGER NOT NULL,
    created_by TEXT NOT NULL,
    owner_agent TEXT,
    anchor_message_guid TEXT,
    anchor_hidden INTEGER NOT NULL DEFAULT 0,
    last_activity_at INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_threads_name ON threads(name);

CREATE TABLE IF NOT EXISTS agents (
    agent_id TEXT PRIMARY KEY,
    guid TEXT NOT NULL,
    managed INTEGER NOT NULL DEFAULT 0,
    invoke TEXT,
    presence TEXT NOT NULL DEFAULT 'offline',
    status TEXT,
    avatar TEXT,
    registered_at INTEGER NOT NULL,
    last_seen INTEGER NOT NULL DEFAULT 0,
    left_at INTEGER,
    mention_watermark TEXT,
    reaction_watermark INTEGER NOT NULL DEFAULT 0,
    last_heartbeat INTEGER NOT NULL DEFAULT 0,
    last_session_id TEXT,
    session_mode TEXT,
    job_id TEXT,
    job_idx INTEGER,
    is_ephemeral INTEGER NOT NULL DEFAULT 0,
    last_known_input INTEGER NOT NULL DEFAULT 0,
    last_known_output INTEGER NOT NULL DEFAULT 0,
    tokens_updated_at INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS jobs (
    guid TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    context TEXT,
    owner_agent TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'running',
    thread_guid TEXT,
    created_at INTEGER NOT NULL,
    completed_at INTEGER
);

CREATE TABLE IF NOT EXISTS questions (
    guid TEXT PRIMARY KEY,
    asked_by TEXT NOT NULL,
    asked_of TEXT,
    body TEXT NOT NULL,
    home TEXT,
    status TEXT NOT NULL DEFAULT 'open',
    answer TEXT,
    created_at INTEGER NOT NULL,
    answered_at INTEGER
);

CREATE TABLE IF NOT EXISTS wake_conditions (
    guid TEXT PRIMARY KEY,
    agent_id TEXT NOT NULL,
    set_by TEXT NOT NULL,
    wake_type TEXT NOT NULL,
    pattern TEXT,
    on_agents TEXT NOT NULL DEFAULT '[]',
    in_thread TEXT,
    after_ms INTEGER NOT NULL DEFAULT 0,
    use_router INTEGER NOT NULL DEFAULT 0,
    prompt_text TEXT,
    poll_interval_ms INTEGER NOT NULL DEFAULT 0,
    last_polled_at INTEGER NOT NULL DEFAULT 0,
    persist_mode TEXT NOT NULL DEFAULT 'none',
    paused INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    expires_at INTEGER
);

CREATE TABLE IF NOT EXISTS faves (
    agent TEXT NOT NULL,
    message TEXT NOT NULL,
    at INTEGER NOT NULL,
    PRIMARY KEY (agent, message)
);

CREATE TABLE IF NOT EXISTS pins (
    thread TEXT NOT NULL,
    message TEXT NOT NULL,
    by_agent TEXT NOT NULL,
    at INTEGER NOT NULL,
    PRIMARY KEY (thread, message)
);

CREATE TABLE IF NOT EXISTS read_marks (
    agent TEXT NOT NULL,
    home TEXT NOT NULL,
    message TEXT NOT NULL,
    at INTEGER NOT NULL,
    PRIMARY KEY (agent, home)
);
";

/// Handle to the SQLite cache. One connection per process; WAL mode allows
/// concurrent readers across processes.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the cache at `path` in WAL mode.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Self::from_connection(conn)
    }

    /// In-memory cache for tests.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Staging target for rebuild: plain journal mode so the result is a
    /// single file that can be renamed over the live cache.
    pub(crate) fn open_rebuild_target(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version < SCHEMA_VERSION {
            conn.execute_batch(SCHEMA)?;
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }
        Ok(Self { conn })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

pub(crate) fn json_vec(raw: String) -> Vec<String> {
    serde_json::from_str(&raw).unwrap_or_default()
}

pub(crate) fn json_map(raw: String) -> std::collections::HashMap<String, String> {
    serde_json::from_str(&raw).unwrap_or_default()
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
