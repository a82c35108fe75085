// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Integrity probes: `shared/checksums.json`.
//!
//! The manifest records SHA-256 and line count for every shared file at
//! the last quiesced point. Mismatches are warnings, not failures; a
//! partially synced tree is expected mid-transport.

use crate::error::StorageError;
use crate::paths::FrayPaths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChecksum {
    pub sha256: String,
    pub lines: u64,
}

/// shared-relative path → checksum. BTreeMap keeps the file deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumManifest {
    /// When the manifest was last quiesced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
    pub files: BTreeMap<String, FileChecksum>,
}

fn checksum_file(path: &Path) -> Result<FileChecksum, StorageError> {
    let content = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    let lines = content.iter().filter(|b| **b == b'\n').count() as u64;
    Ok(FileChecksum {
        sha256: format!("{:x}", hasher.finalize()),
        lines,
    })
}

fn collect(paths: &FrayPaths) -> Result<ChecksumManifest, StorageError> {
    let mut manifest = ChecksumManifest::default();
    for machine in paths.list_machines()? {
        let dir = paths.machine_dir(&machine);
        for file in crate::log::LogFile::shared() {
            let path = dir.join(file.file_name());
            if !path.is_file() {
                continue;
            }
            let key = format!("machines/{}/{}", machine, file.file_name());
            manifest.files.insert(key, checksum_file(&path)?);
        }
    }
    Ok(manifest)
}

/// Recompute and write the manifest (temp + rename).
pub fn write_manifest(paths: &FrayPaths) -> Result<ChecksumManifest, StorageError> {
    let mut manifest = collect(paths)?;
    manifest.recorded_at = Some(Utc::now());
    let target = paths.checksums();
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = target.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_string_pretty(&manifest)?)?;
    std::fs::rename(&tmp, &target)?;
    Ok(manifest)
}

/// Compare current files against the recorded manifest.
///
/// Returns the shared-relative paths that differ. Emits warnings; never
/// fails the caller over a mismatch.
pub fn verify_manifest(paths: &FrayPaths) -> Result<Vec<String>, StorageError> {
    let recorded: ChecksumManifest = match std::fs::read_to_string(paths.checksums()) {
        Ok(content) => serde_json::from_str(&content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let current = collect(paths)?;

    let mut mismatched = Vec::new();
    for (key, checksum) in &recorded.files {
        if current.files.get(key) != Some(checksum) {
            warn!(file = %key, "checksum mismatch against recorded manifest");
            mismatched.push(key.clone());
        }
    }
    for key in current.files.keys() {
        if !recorded.files.contains_key(key) {
            warn!(file = %key, "file appeared since recorded manifest");
            mismatched.push(key.clone());
        }
    }
    Ok(mismatched)
}

#[cfg(test)]
#[path = "checksum_tests.rs"]
mod tests;
