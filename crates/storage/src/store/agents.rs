// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent reads.

use super::Store;
use crate::error::StorageError;
use fray_core::{AgentId, AgentRecord, InvokeConfig, JobId, Presence, SessionId};
use rusqlite::{params, OptionalExtension, Row};

const AGENT_COLS: &str = "agent_id, guid, managed, invoke, presence, status, avatar, \
     registered_at, last_seen, left_at, mention_watermark, reaction_watermark, \
     last_heartbeat, last_session_id, session_mode, job_id, job_idx, is_ephemeral, \
     last_known_input, last_known_output, tokens_updated_at";

pub(crate) fn presence_from_str(s: &str) -> Presence {
    match s {
        "spawning" => Presence::Spawning,
        "active" => Presence::Active,
        "prompting" => Presence::Prompting,
        "prompted" => Presence::Prompted,
        "idle" => Presence::Idle,
        "error" => Presence::Error,
        _ => Presence::Offline,
    }
}

pub(crate) fn row_to_agent(row: &Row<'_>) -> rusqlite::Result<AgentRecord> {
    let invoke_raw: Option<String> = row.get(3)?;
    Ok(AgentRecord {
        agent_id: AgentId::new(row.get::<_, String>(0)?),
        guid: row.get(1)?,
        managed: row.get(2)?,
        invoke: invoke_raw.and_then(|raw| serde_json::from_str::<InvokeConfig>(&raw).ok()),
        presence: presence_from_str(&row.get::<_, String>(4)?),
        status: row.get(5)?,
        avatar: row.get(6)?,
        registered_at: row.get(7)?,
        last_seen: row.get(8)?,
        left_at: row.get(9)?,
        mention_watermark: row.get(10)?,
        reaction_watermark: row.get(11)?,
        last_heartbeat: row.get::<_, i64>(12)? as u64,
        last_session_id: row.get::<_, Option<String>>(13)?.map(SessionId::new),
        session_mode: row.get(14)?,
        job_id: row.get::<_, Option<String>>(15)?.map(JobId::new),
        job_idx: row.get(16)?,
        is_ephemeral: row.get(17)?,
        last_known_input: row.get::<_, i64>(18)? as u64,
        last_known_output: row.get::<_, i64>(19)? as u64,
        tokens_updated_at: row.get(20)?,
    })
}

impl Store {
    pub fn get_agent(&self, agent_id: &str) -> Result<AgentRecord, StorageError> {
        self.try_get_agent(agent_id)?
            .ok_or_else(|| StorageError::not_found("agent", agent_id))
    }

    pub fn try_get_agent(&self, agent_id: &str) -> Result<Option<AgentRecord>, StorageError> {
        let sql = format!("SELECT {AGENT_COLS} FROM agents WHERE agent_id = ?1");
        Ok(self
            .conn()
            .query_row(&sql, params![agent_id], row_to_agent)
            .optional()?)
    }

    pub fn list_agents(&self) -> Result<Vec<AgentRecord>, StorageError> {
        let sql = format!("SELECT {AGENT_COLS} FROM agents ORDER BY agent_id");
        let mut stmt = self.conn().prepare(&sql)?;
        let result = stmt.query_map([], row_to_agent)?.collect::<Result<_, _>>()?;
        Ok(result)
    }

    /// Managed agents eligible for daemon spawning.
    pub fn managed_agents(&self) -> Result<Vec<AgentRecord>, StorageError> {
        let sql = format!("SELECT {AGENT_COLS} FROM agents WHERE managed = 1 ORDER BY agent_id");
        let mut stmt = self.conn().prepare(&sql)?;
        let result = stmt.query_map([], row_to_agent)?.collect::<Result<_, _>>()?;
        Ok(result)
    }

    /// Agents whose base name matches `base` exactly or as a subagent
    /// parent (`base.*`), plus job workers `base[suffix-idx]`.
    pub fn agents_matching_base(&self, base: &str) -> Result<Vec<AgentRecord>, StorageError> {
        let sql = format!(
            "SELECT {AGENT_COLS} FROM agents WHERE agent_id = ?1 \
             OR agent_id LIKE ?1 || '.%' OR agent_id LIKE ?1 || '[%' ORDER BY agent_id"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let result = stmt
            .query_map(params![base], row_to_agent)?
            .collect::<Result<_, _>>()?;
        Ok(result)
    }

    /// Live job workers for a base name (`dev[ab12-0]`, …). A mention of
    /// the bare base is ambiguous while any of these exist.
    pub fn active_workers_for_base(&self, base: &str) -> Result<Vec<AgentRecord>, StorageError> {
        let sql = format!(
            "SELECT {AGENT_COLS} FROM agents WHERE agent_id LIKE ?1 || '[%' \
             AND is_ephemeral = 1 AND left_at IS NULL ORDER BY agent_id"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let result = stmt
            .query_map(params![base], row_to_agent)?
            .collect::<Result<_, _>>()?;
        Ok(result)
    }
}

#[cfg(test)]
#[path = "agents_tests.rs"]
mod tests;
