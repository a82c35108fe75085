// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Machine identity and per-machine sequence allocation.
//!
//! `local/machine-id` holds `{"id": "...", "seq": N, "created_at": T}`.
//! `seq` is the per-machine monotonic counter carried by every envelope;
//! it is incremented under an advisory lock and persisted via temp+rename
//! before the caller sees the new value, so two CLI processes on the same
//! machine never emit the same `(origin, seq)` pair.

use crate::error::StorageError;
use fray_core::MachineId;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MachineIdFile {
    id: String,
    seq: u64,
    created_at: i64,
}

/// Handle to this machine's identity file.
#[derive(Debug, Clone)]
pub struct MachineIdentity {
    path: PathBuf,
    id: MachineId,
}

impl MachineIdentity {
    /// Create the identity file. Fails if one already exists.
    pub fn create(path: &Path, id: &str, created_at: i64) -> Result<Self, StorageError> {
        if path.exists() {
            return Err(StorageError::InvariantViolation(format!(
                "machine-id already exists at {}",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let doc = MachineIdFile {
            id: id.to_string(),
            seq: 0,
            created_at,
        };
        write_atomic(path, &doc)?;
        Ok(Self {
            path: path.to_owned(),
            id: MachineId::new(id),
        })
    }

    /// Open an existing identity file.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let doc = read_doc(path)?;
        Ok(Self {
            path: path.to_owned(),
            id: MachineId::new(doc.id),
        })
    }

    pub fn id(&self) -> &MachineId {
        &self.id
    }

    /// Allocate the next sequence number.
    ///
    /// Lock → read → increment → temp+rename → unlock. The new value is
    /// durable before it is returned.
    pub fn next_seq(&self) -> Result<u64, StorageError> {
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(lock_path(&self.path))?;
        lock.lock_exclusive()?;
        let result = self.bump_seq();
        let _ = fs2::FileExt::unlock(&lock);
        result
    }

    fn bump_seq(&self) -> Result<u64, StorageError> {
        let mut doc = read_doc(&self.path)?;
        doc.seq += 1;
        write_atomic(&self.path, &doc)?;
        Ok(doc.seq)
    }

    /// Highest allocated sequence number.
    pub fn current_seq(&self) -> Result<u64, StorageError> {
        Ok(read_doc(&self.path)?.seq)
    }
}

fn lock_path(path: &Path) -> PathBuf {
    path.with_extension("lock")
}

fn read_doc(path: &Path) -> Result<MachineIdFile, StorageError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::not_found("machine-id", path.display().to_string())
        } else {
            StorageError::Io(e)
        }
    })?;
    Ok(serde_json::from_str(&content)?)
}

fn write_atomic(path: &Path, doc: &MachineIdFile) -> Result<(), StorageError> {
    let tmp = path.with_extension("tmp");
    {
        let mut file = File::create(&tmp)?;
        file.write_all(serde_json::to_string(doc)?.as_bytes())?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
