// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job reads.

use super::Store;
use crate::error::StorageError;
use fray_core::{AgentId, Job, JobId, JobStatus, ThreadId};
use rusqlite::{params, OptionalExtension, Row};

const JOB_COLS: &str = "guid, name, context, owner_agent, status, thread_guid, created_at, completed_at";

pub(crate) fn status_from_str(s: &str) -> JobStatus {
    match s {
        "completed" => JobStatus::Completed,
        "cancelled" => JobStatus::Cancelled,
        "failed" => JobStatus::Failed,
        _ => JobStatus::Running,
    }
}

pub(crate) fn row_to_job(row: &Row<'_>) -> rusqlite::Result<Job> {
    let context_raw: Option<String> = row.get(2)?;
    Ok(Job {
        guid: JobId::new(row.get::<_, String>(0)?),
        name: row.get(1)?,
        context: context_raw.and_then(|raw| serde_json::from_str(&raw).ok()),
        owner_agent: AgentId::new(row.get::<_, String>(3)?),
        status: status_from_str(&row.get::<_, String>(4)?),
        thread_guid: row.get::<_, Option<String>>(5)?.map(ThreadId::new),
        created_at: row.get(6)?,
        completed_at: row.get(7)?,
    })
}

impl Store {
    pub fn get_job(&self, guid: &str) -> Result<Job, StorageError> {
        let sql = format!("SELECT {JOB_COLS} FROM jobs WHERE guid = ?1");
        self.conn()
            .query_row(&sql, params![guid], row_to_job)
            .optional()?
            .ok_or_else(|| StorageError::not_found("job", guid))
    }

    pub fn list_jobs(&self) -> Result<Vec<Job>, StorageError> {
        let sql = format!("SELECT {JOB_COLS} FROM jobs ORDER BY created_at, guid");
        let mut stmt = self.conn().prepare(&sql)?;
        let result = stmt.query_map([], row_to_job)?.collect::<Result<_, _>>()?;
        Ok(result)
    }

    pub fn open_jobs(&self) -> Result<Vec<Job>, StorageError> {
        let sql = format!("SELECT {JOB_COLS} FROM jobs WHERE status = 'running' ORDER BY created_at, guid");
        let mut stmt = self.conn().prepare(&sql)?;
        let result = stmt.query_map([], row_to_job)?.collect::<Result<_, _>>()?;
        Ok(result)
    }

    /// Worker agents registered to a job, by index.
    pub fn job_workers(&self, job: &JobId) -> Result<Vec<fray_core::AgentRecord>, StorageError> {
        let sql = format!(
            "SELECT {} FROM agents WHERE job_id = ?1 ORDER BY job_idx",
            "agent_id, guid, managed, invoke, presence, status, avatar, registered_at, \
             last_seen, left_at, mention_watermark, reaction_watermark, last_heartbeat, \
             last_session_id, session_mode, job_id, job_idx, is_ephemeral, \
             last_known_input, last_known_output, tokens_updated_at"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let result = stmt
            .query_map(params![job.as_str()], super::agents::row_to_agent)?
            .collect::<Result<_, _>>()?;
        Ok(result)
    }
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
