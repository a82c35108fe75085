// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread reads and reference resolution.

use super::messages::MIN_PREFIX;
use super::Store;
use crate::error::StorageError;
use fray_core::{AgentId, MessageId, Thread, ThreadId, ThreadKind, ThreadStatus};
use rusqlite::{params, OptionalExtension, Row};

const THREAD_COLS: &str = "guid, name, parent_thread, status, kind, created_at, created_by, \
     owner_agent, anchor_message_guid, anchor_hidden, last_activity_at";

/// How a thread was referenced on the command line: full GUID, GUID prefix
/// (≥ 4 chars), or name/path, tried in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRef(pub String);

pub(crate) fn status_from_str(s: &str) -> ThreadStatus {
    match s {
        "archived" => ThreadStatus::Archived,
        _ => ThreadStatus::Open,
    }
}

pub(crate) fn kind_from_str(s: &str) -> ThreadKind {
    match s {
        "knowledge" => ThreadKind::Knowledge,
        "system" => ThreadKind::System,
        _ => ThreadKind::Standard,
    }
}

pub(crate) fn row_to_thread(row: &Row<'_>) -> rusqlite::Result<Thread> {
    Ok(Thread {
        guid: ThreadId::new(row.get::<_, String>(0)?),
        name: row.get(1)?,
        parent_thread: row.get::<_, Option<String>>(2)?.map(ThreadId::new),
        status: status_from_str(&row.get::<_, String>(3)?),
        kind: kind_from_str(&row.get::<_, String>(4)?),
        created_at: row.get(5)?,
        created_by: AgentId::new(row.get::<_, String>(6)?),
        owner_agent: row.get::<_, Option<String>>(7)?.map(AgentId::new),
        anchor_message_guid: row.get::<_, Option<String>>(8)?.map(MessageId::new),
        anchor_hidden: row.get(9)?,
        last_activity_at: row.get(10)?,
    })
}

impl Store {
    pub fn get_thread(&self, guid: &str) -> Result<Thread, StorageError> {
        self.try_get_thread(guid)?
            .ok_or_else(|| StorageError::not_found("thread", guid))
    }

    pub fn try_get_thread(&self, guid: &str) -> Result<Option<Thread>, StorageError> {
        let sql = format!("SELECT {THREAD_COLS} FROM threads WHERE guid = ?1");
        Ok(self
            .conn()
            .query_row(&sql, params![guid], row_to_thread)
            .optional()?)
    }

    /// Resolve a thread reference: full GUID, then GUID prefix (≥ 4
    /// chars), then name/path.
    pub fn resolve_thread(&self, reference: &ThreadRef) -> Result<Thread, StorageError> {
        let needle = reference.0.as_str();

        if let Some(thread) = self.try_get_thread(needle)? {
            return Ok(thread);
        }

        if needle.len() >= MIN_PREFIX {
            let sql = format!(
                "SELECT {THREAD_COLS} FROM threads WHERE guid LIKE ?1 || '%' ORDER BY guid LIMIT 10"
            );
            let mut stmt = self.conn().prepare(&sql)?;
            let matches: Vec<Thread> = stmt
                .query_map(params![needle], row_to_thread)?
                .collect::<Result<_, _>>()?;
            match matches.len() {
                1 => {
                    let mut it = matches.into_iter();
                    if let Some(thread) = it.next() {
                        return Ok(thread);
                    }
                }
                n if n > 1 => {
                    return Err(StorageError::ambiguous(
                        "thread",
                        needle,
                        matches.iter().map(|t| t.guid.to_string()).collect(),
                    ))
                }
                _ => {}
            }
        }

        let sql = format!("SELECT {THREAD_COLS} FROM threads WHERE name = ?1 ORDER BY created_at LIMIT 2");
        let mut stmt = self.conn().prepare(&sql)?;
        let matches: Vec<Thread> = stmt
            .query_map(params![needle], row_to_thread)?
            .collect::<Result<_, _>>()?;
        match matches.len() {
            0 => Err(StorageError::not_found("thread", needle)),
            1 => Ok(matches.into_iter().next().ok_or_else(|| {
                StorageError::not_found("thread", needle)
            })?),
            _ => Err(StorageError::ambiguous(
                "thread",
                needle,
                matches.iter().map(|t| t.guid.to_string()).collect(),
            )),
        }
    }

    /// All threads ordered by creation.
    pub fn list_threads(&self) -> Result<Vec<Thread>, StorageError> {
        let sql = format!("SELECT {THREAD_COLS} FROM threads ORDER BY created_at, guid");
        let mut stmt = self.conn().prepare(&sql)?;
        let result = stmt
            .query_map([], row_to_thread)?
            .collect::<Result<_, _>>()?;
        Ok(result)
    }

    /// Direct children of a thread, ordered by `created_at`.
    pub fn thread_children(&self, parent: &ThreadId) -> Result<Vec<Thread>, StorageError> {
        let sql = format!(
            "SELECT {THREAD_COLS} FROM threads WHERE parent_thread = ?1 ORDER BY created_at, guid"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let result = stmt
            .query_map(params![parent.as_str()], row_to_thread)?
            .collect::<Result<_, _>>()?;
        Ok(result)
    }
}

#[cfg(test)]
#[path = "threads_tests.rs"]
mod tests;
