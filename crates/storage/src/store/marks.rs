// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Faves, pins, and read-position reads.

use super::Store;
use crate::error::StorageError;
use fray_core::{AgentId, Fave, MessageId, Pin, ReadTo, Subscription, ThreadId};
use rusqlite::{params, OptionalExtension};

impl Store {
    pub fn faves_for(&self, agent: &str) -> Result<Vec<Fave>, StorageError> {
        let mut stmt = self
            .conn()
            .prepare("SELECT agent, message, at FROM faves WHERE agent = ?1 ORDER BY at, message")?;
        let result = stmt
            .query_map(params![agent], |row| {
                Ok(Fave {
                    agent: AgentId::new(row.get::<_, String>(0)?),
                    message: MessageId::new(row.get::<_, String>(1)?),
                    at: row.get(2)?,
                })
            })?
            .collect::<Result<_, _>>()?;
        Ok(result)
    }

    /// Message ids faved by anyone. Used by prune's required-id set.
    pub fn faved_message_ids(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self
            .conn()
            .prepare("SELECT DISTINCT message FROM faves ORDER BY message")?;
        let result = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<_, _>>()?;
        Ok(result)
    }

    pub fn pins_for(&self, thread: &ThreadId) -> Result<Vec<Pin>, StorageError> {
        let mut stmt = self.conn().prepare(
            "SELECT thread, message, by_agent, at FROM pins WHERE thread = ?1 ORDER BY at, message",
        )?;
        let result = stmt
            .query_map(params![thread.as_str()], |row| {
                Ok(Pin {
                    thread: ThreadId::new(row.get::<_, String>(0)?),
                    message: MessageId::new(row.get::<_, String>(1)?),
                    by: AgentId::new(row.get::<_, String>(2)?),
                    at: row.get(3)?,
                })
            })?
            .collect::<Result<_, _>>()?;
        Ok(result)
    }

    pub fn read_mark(&self, agent: &str, home: &str) -> Result<Option<ReadTo>, StorageError> {
        Ok(self
            .conn()
            .query_row(
                "SELECT agent, home, message, at FROM read_marks WHERE agent = ?1 AND home = ?2",
                params![agent, home],
                |row| {
                    Ok(ReadTo {
                        agent: AgentId::new(row.get::<_, String>(0)?),
                        home: row.get(1)?,
                        message: MessageId::new(row.get::<_, String>(2)?),
                        at: row.get(3)?,
                    })
                },
            )
            .optional()?)
    }

    pub fn subscriptions_for(&self, agent: &str) -> Result<Vec<Subscription>, StorageError> {
        let mut stmt = self.conn().prepare(
            "SELECT agent, thread, at FROM subscriptions WHERE agent = ?1 ORDER BY at, thread",
        )?;
        let result = stmt
            .query_map(params![agent], |row| {
                Ok(Subscription {
                    agent: AgentId::new(row.get::<_, String>(0)?),
                    thread: ThreadId::new(row.get::<_, String>(1)?),
                    at: row.get(2)?,
                })
            })?
            .collect::<Result<_, _>>()?;
        Ok(result)
    }

    /// Message ids with at least one reaction. Used by prune.
    pub fn reacted_message_ids(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self
            .conn()
            .prepare("SELECT DISTINCT message FROM reactions ORDER BY message")?;
        let result = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<_, _>>()?;
        Ok(result)
    }
}

#[cfg(test)]
#[path = "marks_tests.rs"]
mod tests;
