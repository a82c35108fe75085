// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-invocation context: open project, clock, id generator, identity.

use crate::exit::ExitError;
use fray_core::{AgentId, Clock, SessionId, SystemClock, UlidGen};
use fray_storage::Project;

/// Environment variable naming the acting agent; sub-commands default to
/// it for "self".
pub const ENV_AGENT_ID: &str = "FRAY_AGENT_ID";
/// Set by the daemon to the home of the triggering message.
pub const ENV_TRIGGER_HOME: &str = "FRAY_TRIGGER_HOME";
/// Driver-provided session id, captured on each post.
pub const ENV_CLAUDE_SESSION: &str = "CLAUDE_SESSION_ID";

pub struct CliContext {
    pub project: Project,
    pub clock: SystemClock,
    pub id_gen: UlidGen,
}

impl CliContext {
    /// Discover the project from the working directory.
    pub fn open() -> Result<Self, ExitError> {
        let cwd = std::env::current_dir()?;
        let clock = SystemClock;
        let project = Project::discover(&cwd, clock.unix_ts()).map_err(|e| {
            ExitError::operational(format!("{e} (run `fray init` to create a project)"))
        })?;
        Ok(Self {
            project,
            clock,
            id_gen: UlidGen,
        })
    }

    pub fn ts(&self) -> i64 {
        self.clock.unix_ts()
    }

    /// The acting agent: `--as`, else `FRAY_AGENT_ID`, else `user`.
    pub fn self_agent(&self, explicit: Option<&str>) -> AgentId {
        let name = explicit
            .map(str::to_string)
            .or_else(|| std::env::var(ENV_AGENT_ID).ok())
            .unwrap_or_else(|| "user".to_string());
        AgentId::new(name.to_lowercase())
    }

    pub fn driver_session(&self) -> Option<SessionId> {
        std::env::var(ENV_CLAUDE_SESSION).ok().map(SessionId::new)
    }

    pub fn trigger_home(&self) -> Option<String> {
        std::env::var(ENV_TRIGGER_HOME).ok().filter(|h| !h.is_empty())
    }
}
