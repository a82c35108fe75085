// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real subprocess driver adapter.

use super::{
    DriverAdapter, DriverError, DriverHandle, LaunchSpec, ENV_AGENT_ID, ENV_JOB_ID, ENV_JOB_IDX,
    ENV_TRIGGER_HOME,
};
use fray_core::{PromptDelivery, SessionId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Write;
use std::process::{Child, Command, Stdio};
use tracing::{debug, warn};

/// Launches drivers as detached children and tracks them for exit
/// supervision. One live entry per session.
#[derive(Default)]
pub struct ProcessDriverAdapter {
    children: Mutex<HashMap<SessionId, Child>>,
}

impl ProcessDriverAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DriverAdapter for ProcessDriverAdapter {
    fn launch(&self, spec: &LaunchSpec) -> Result<DriverHandle, DriverError> {
        let session_id = SessionId::new(uuid::Uuid::new_v4().to_string());

        let mut command = Command::new(&spec.driver);
        command.args(&spec.args);
        if let Some(cwd) = &spec.cwd {
            command.current_dir(cwd);
        }
        command.env(ENV_AGENT_ID, &spec.agent_id);
        command.env(ENV_TRIGGER_HOME, &spec.trigger_home);
        if let Some((job_id, idx)) = &spec.job {
            command.env(ENV_JOB_ID, job_id);
            command.env(ENV_JOB_IDX, idx.to_string());
        }
        for (key, value) in &spec.env {
            command.env(key, value);
        }
        if let Some(resume) = &spec.resume_session {
            command.env("FRAY_RESUME_SESSION", resume);
        }

        match spec.prompt_delivery {
            PromptDelivery::Stdin => {
                command.stdin(Stdio::piped());
            }
            PromptDelivery::Args => {
                if !spec.prompt.is_empty() {
                    command.arg(&spec.prompt);
                }
                command.stdin(Stdio::null());
            }
        }
        command.stdout(Stdio::null());
        command.stderr(Stdio::null());

        // Own process group: the session outlives whoever launched it
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command.spawn().map_err(|e| DriverError::Launch {
            driver: spec.driver.clone(),
            message: e.to_string(),
        })?;

        if spec.prompt_delivery == PromptDelivery::Stdin {
            if let Some(mut stdin) = child.stdin.take() {
                if let Err(e) = stdin.write_all(spec.prompt.as_bytes()) {
                    warn!(agent = %spec.agent_id, error = %e, "writing wake prompt to stdin failed");
                }
            }
        }

        let pid = child.id();
        debug!(
            agent = %spec.agent_id,
            driver = %spec.driver,
            pid,
            session = %session_id.short(8),
            "driver launched"
        );

        self.children.lock().insert(session_id.clone(), child);
        Ok(DriverHandle {
            session_id,
            pid: Some(pid),
        })
    }

    fn signal_stop(&self, handle: &DriverHandle) -> Result<(), DriverError> {
        let Some(pid) = handle.pid else {
            return Ok(());
        };
        let status = Command::new("kill")
            .args(["-TERM", &pid.to_string()])
            .status()
            .map_err(|e| DriverError::Signal(e.to_string()))?;
        if !status.success() {
            return Err(DriverError::Signal(format!(
                "kill -TERM {pid} exited with {status}"
            )));
        }
        Ok(())
    }

    fn kill(&self, handle: &DriverHandle) -> Result<(), DriverError> {
        let mut children = self.children.lock();
        let child = children
            .get_mut(&handle.session_id)
            .ok_or_else(|| DriverError::UnknownSession(handle.session_id.clone()))?;
        child.kill()?;
        Ok(())
    }

    fn try_wait(&self, handle: &DriverHandle) -> Result<Option<i32>, DriverError> {
        let mut children = self.children.lock();
        let child = children
            .get_mut(&handle.session_id)
            .ok_or_else(|| DriverError::UnknownSession(handle.session_id.clone()))?;
        match child.try_wait()? {
            Some(status) => {
                let code = status.code().unwrap_or(-1);
                children.remove(&handle.session_id);
                Ok(Some(code))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
