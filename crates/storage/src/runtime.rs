// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Machine-local runtime log.
//!
//! `local/runtime.jsonl` carries strictly machine-local state: agent
//! registrations, sessions, heartbeats, presence. It is never synced and
//! is overlaid on top of shared state at the end of rebuild, so a
//! machine's own view of its live sessions wins over anything merged in.

use crate::error::StorageError;
use crate::log::{append_envelope, scan_log, ScannedRecord};
use fray_core::Envelope;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RuntimeLog {
    path: PathBuf,
}

impl RuntimeLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durably append one record. Same discipline as the shared logs.
    pub fn append(&self, envelope: &Envelope) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        append_envelope(&self.path, envelope)
    }

    /// All records in file order.
    pub fn scan(&self) -> Result<Vec<ScannedRecord>, StorageError> {
        scan_log(&self.path)
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
