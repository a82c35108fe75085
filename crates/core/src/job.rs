// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job record and worker naming.

use crate::{AgentId, JobId, ThreadId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Cancelled => write!(f, "cancelled"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A unit of multi-agent work with ephemeral worker agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub guid: JobId,
    pub name: String,
    /// Opaque context handed to workers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
    pub owner_agent: AgentId,
    #[serde(default)]
    pub status: JobStatus,
    /// Auto-created coordination thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_guid: Option<ThreadId>,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

impl Job {
    pub fn is_open(&self) -> bool {
        self.status == JobStatus::Running
    }
}

/// First four base36 characters of the job GUID tail, used to brand worker
/// agent ids.
pub fn worker_suffix(job_guid: &JobId) -> String {
    let tail = job_guid
        .as_str()
        .split_once('-')
        .map_or(job_guid.as_str(), |(_, t)| t);
    tail.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(4)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Agent id for worker `idx` of a job: `<base>[<suffix>-<idx>]`.
pub fn worker_agent_id(base: &str, job_guid: &JobId, idx: u32) -> AgentId {
    AgentId::new(format!("{}[{}-{}]", base, worker_suffix(job_guid), idx))
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
