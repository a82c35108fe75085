// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk layout of a `.fray/` project directory.
//!
//! ```text
//! .fray/
//!   fray-config.json
//!   shared/                  # synced out-of-band
//!     checksums.json
//!     machines/<id>/{messages,threads,questions,agent-state}.jsonl
//!   local/                   # never synced
//!     machine-id
//!     runtime.jsonl
//!     fray.db
//!     history.jsonl
//!     collisions.json
//!   llm/{routers,prompts,slash}/
//! ```

use std::path::{Path, PathBuf};

pub const FRAY_DIR: &str = ".fray";

/// Path derivation for one project. All consumers compute paths through
/// this struct rather than joining strings ad hoc.
#[derive(Debug, Clone)]
pub struct FrayPaths {
    root: PathBuf,
}

impl FrayPaths {
    /// `project_root` is the directory containing `.fray/`.
    pub fn new(project_root: &Path) -> Self {
        Self {
            root: project_root.join(FRAY_DIR),
        }
    }

    /// Walk up from `start` to the nearest ancestor containing `.fray/`.
    pub fn discover(start: &Path) -> Option<Self> {
        let mut dir = Some(start);
        while let Some(d) = dir {
            if d.join(FRAY_DIR).is_dir() {
                return Some(Self::new(d));
            }
            dir = d.parent();
        }
        None
    }

    pub fn fray_dir(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> PathBuf {
        self.root.join("fray-config.json")
    }

    pub fn shared(&self) -> PathBuf {
        self.root.join("shared")
    }

    pub fn checksums(&self) -> PathBuf {
        self.shared().join("checksums.json")
    }

    pub fn machines_dir(&self) -> PathBuf {
        self.shared().join("machines")
    }

    pub fn machine_dir(&self, machine_id: &str) -> PathBuf {
        self.machines_dir().join(machine_id)
    }

    pub fn local(&self) -> PathBuf {
        self.root.join("local")
    }

    pub fn machine_id_file(&self) -> PathBuf {
        self.local().join("machine-id")
    }

    pub fn runtime_log(&self) -> PathBuf {
        self.local().join("runtime.jsonl")
    }

    pub fn db(&self) -> PathBuf {
        self.local().join("fray.db")
    }

    pub fn history(&self) -> PathBuf {
        self.local().join("history.jsonl")
    }

    pub fn collisions(&self) -> PathBuf {
        self.local().join("collisions.json")
    }

    pub fn daemon_lock(&self) -> PathBuf {
        self.local().join("daemon.pid")
    }

    pub fn daemon_log(&self) -> PathBuf {
        self.local().join("daemon.log")
    }

    pub fn llm_dir(&self) -> PathBuf {
        self.root.join("llm")
    }

    pub fn routers_dir(&self) -> PathBuf {
        self.llm_dir().join("routers")
    }

    pub fn prompts_dir(&self) -> PathBuf {
        self.llm_dir().join("prompts")
    }

    /// Machine ids present under `shared/machines/`, sorted for
    /// deterministic file indexing during rebuild.
    pub fn list_machines(&self) -> std::io::Result<Vec<String>> {
        let dir = self.machines_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut ids: Vec<String> = std::fs::read_dir(&dir)?
            .filter_map(|entry| {
                let entry = entry.ok()?;
                entry
                    .file_type()
                    .ok()?
                    .is_dir()
                    .then(|| entry.file_name().to_string_lossy().into_owned())
            })
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
