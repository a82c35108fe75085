// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wake-condition reads.

use super::Store;
use crate::error::StorageError;
use fray_core::{AgentId, PersistMode, ThreadId, WakeCondition, WakeId, WakeType};
use rusqlite::{params, OptionalExtension, Row};

const WAKE_COLS: &str = "guid, agent_id, set_by, wake_type, pattern, on_agents, in_thread, \
     after_ms, use_router, prompt_text, poll_interval_ms, last_polled_at, persist_mode, \
     paused, created_at, expires_at";

pub(crate) fn wake_type_from_str(s: &str) -> WakeType {
    match s {
        "after" => WakeType::After,
        "pattern" => WakeType::Pattern,
        "prompt" => WakeType::Prompt,
        _ => WakeType::OnMention,
    }
}

pub(crate) fn persist_mode_from_str(s: &str) -> PersistMode {
    match s {
        "persist" => PersistMode::Persist,
        "persist_until_bye" => PersistMode::PersistUntilBye,
        "persist_restore_on_back" => PersistMode::PersistRestoreOnBack,
        _ => PersistMode::None,
    }
}

pub(crate) fn persist_mode_to_str(mode: PersistMode) -> &'static str {
    match mode {
        PersistMode::None => "none",
        PersistMode::Persist => "persist",
        PersistMode::PersistUntilBye => "persist_until_bye",
        PersistMode::PersistRestoreOnBack => "persist_restore_on_back",
    }
}

pub(crate) fn row_to_wake(row: &Row<'_>) -> rusqlite::Result<WakeCondition> {
    let on_agents_raw: String = row.get(5)?;
    let on_agents: Vec<String> = serde_json::from_str(&on_agents_raw).unwrap_or_default();
    Ok(WakeCondition {
        guid: WakeId::new(row.get::<_, String>(0)?),
        agent_id: AgentId::new(row.get::<_, String>(1)?),
        set_by: AgentId::new(row.get::<_, String>(2)?),
        wake_type: wake_type_from_str(&row.get::<_, String>(3)?),
        pattern: row.get(4)?,
        on_agents: on_agents.into_iter().map(AgentId::new).collect(),
        in_thread: row.get::<_, Option<String>>(6)?.map(ThreadId::new),
        after_ms: row.get::<_, i64>(7)? as u64,
        use_router: row.get(8)?,
        prompt_text: row.get(9)?,
        poll_interval_ms: row.get::<_, i64>(10)? as u64,
        last_polled_at: row.get(11)?,
        persist_mode: persist_mode_from_str(&row.get::<_, String>(12)?),
        paused: row.get(13)?,
        created_at: row.get(14)?,
        expires_at: row.get(15)?,
    })
}

impl Store {
    pub fn get_wake_condition(&self, guid: &str) -> Result<WakeCondition, StorageError> {
        let sql = format!("SELECT {WAKE_COLS} FROM wake_conditions WHERE guid = ?1");
        self.conn()
            .query_row(&sql, params![guid], row_to_wake)
            .optional()?
            .ok_or_else(|| StorageError::not_found("wake condition", guid))
    }

    /// All conditions, optionally filtered to one agent. Paused conditions
    /// are included; evaluation skips them.
    pub fn list_wake_conditions(
        &self,
        agent: Option<&str>,
    ) -> Result<Vec<WakeCondition>, StorageError> {
        let mut out = Vec::new();
        match agent {
            Some(agent_id) => {
                let sql = format!(
                    "SELECT {WAKE_COLS} FROM wake_conditions WHERE agent_id = ?1 \
                     ORDER BY created_at, guid"
                );
                let mut stmt = self.conn().prepare(&sql)?;
                for row in stmt.query_map(params![agent_id], row_to_wake)? {
                    out.push(row?);
                }
            }
            None => {
                let sql =
                    format!("SELECT {WAKE_COLS} FROM wake_conditions ORDER BY created_at, guid");
                let mut stmt = self.conn().prepare(&sql)?;
                for row in stmt.query_map([], row_to_wake)? {
                    out.push(row?);
                }
            }
        }
        Ok(out)
    }

    /// Active (unpaused) conditions for evaluation.
    pub fn active_wake_conditions(&self) -> Result<Vec<WakeCondition>, StorageError> {
        let sql = format!(
            "SELECT {WAKE_COLS} FROM wake_conditions WHERE paused = 0 ORDER BY created_at, guid"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let result = stmt.query_map([], row_to_wake)?.collect::<Result<_, _>>()?;
        Ok(result)
    }
}

#[cfg(test)]
#[path = "wake_tests.rs"]
mod tests;
