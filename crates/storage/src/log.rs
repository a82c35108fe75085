// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL machine logs.
//!
//! Each line is one serialized [`Envelope`]. Appends are durable before
//! they return: lock → single-line serialize → write → fsync → unlock.
//! Readers tolerate a trailing partial line (a crash mid-append), unknown
//! record types (preserved inert), and empty files.

use crate::error::StorageError;
use fray_core::Envelope;
use fs2::FileExt;
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// The four shared per-machine files plus the machine-local runtime log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogFile {
    Messages,
    Threads,
    Questions,
    AgentState,
    Runtime,
}

impl LogFile {
    pub fn file_name(self) -> &'static str {
        match self {
            LogFile::Messages => "messages.jsonl",
            LogFile::Threads => "threads.jsonl",
            LogFile::Questions => "questions.jsonl",
            LogFile::AgentState => "agent-state.jsonl",
            LogFile::Runtime => "runtime.jsonl",
        }
    }

    /// Shared files in rebuild order. Runtime is separate (overlay).
    pub fn shared() -> [LogFile; 4] {
        [
            LogFile::Messages,
            LogFile::Threads,
            LogFile::Questions,
            LogFile::AgentState,
        ]
    }
}

/// Writer for one machine's log directory.
///
/// Only this machine's process may write here; the advisory lock guards
/// against concurrent CLI invocations on the same machine, not against
/// other machines (single-writer-per-machine is architectural).
#[derive(Debug, Clone)]
pub struct MachineLog {
    dir: PathBuf,
}

impl MachineLog {
    pub fn new(machine_dir: PathBuf) -> Self {
        Self { dir: machine_dir }
    }

    pub fn path(&self, file: LogFile) -> PathBuf {
        self.dir.join(file.file_name())
    }

    /// Durably append one envelope. Returns only after fsync.
    pub fn append(&self, file: LogFile, envelope: &Envelope) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        append_envelope(&self.path(file), envelope)
    }
}

/// Lock → single-line serialize → write → fsync → unlock.
pub(crate) fn append_envelope(path: &Path, envelope: &Envelope) -> Result<(), StorageError> {
    let line = serde_json::to_string(envelope)?;
    if line.contains('\n') {
        return Err(StorageError::InvariantViolation(
            "refusing to append record with embedded newline".to_string(),
        ));
    }

    let mut handle = OpenOptions::new().create(true).append(true).open(path)?;
    handle.lock_exclusive()?;
    let result = (|| -> Result<(), StorageError> {
        handle.write_all(line.as_bytes())?;
        handle.write_all(b"\n")?;
        handle.sync_all()?;
        Ok(())
    })();
    let _ = fs2::FileExt::unlock(&handle);
    result
}

/// One scanned line: parsed envelope or a line the scanner skipped.
#[derive(Debug, Clone)]
pub struct ScannedRecord {
    pub envelope: Envelope,
    /// Line number within the file (1-based), for diagnostics.
    pub line: usize,
}

/// Read a log file in file order.
///
/// A trailing line without a terminating newline is a partial append from
/// a crash and is discarded with a warning. Interior lines that fail to
/// parse are skipped with a warning; the scan never fails on content.
pub fn scan_log(path: &Path) -> Result<Vec<ScannedRecord>, StorageError> {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut reader = BufReader::new(file);
    let mut records = Vec::new();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let bytes_read = reader.read_until(b'\n', &mut buf)?;
        if bytes_read == 0 {
            break;
        }
        line_no += 1;

        if buf.last() != Some(&b'\n') {
            // Partial trailing line: a crash interrupted an append
            warn!(
                path = %path.display(),
                line = line_no,
                "discarding partial trailing line"
            );
            break;
        }

        let text = String::from_utf8_lossy(&buf);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<Envelope>(trimmed) {
            Ok(envelope) => records.push(ScannedRecord {
                envelope,
                line: line_no,
            }),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    line = line_no,
                    error = %e,
                    "skipping unreadable record"
                );
            }
        }
    }

    Ok(records)
}

/// Rewrite a log file to exactly `envelopes`, atomically (temp + rename).
///
/// Used by prune; lines that scanned as [`fray_core::EventBody::Unknown`]
/// round-trip byte-compatibly through their preserved `Value`.
pub fn rewrite_log(path: &Path, envelopes: &[Envelope]) -> Result<(), StorageError> {
    let tmp = path.with_extension("jsonl.tmp");
    {
        let mut file = std::fs::File::create(&tmp)?;
        for envelope in envelopes {
            let line = serde_json::to_string(envelope)?;
            file.write_all(line.as_bytes())?;
            file.write_all(b"\n")?;
        }
        file.sync_all()?;
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Append raw JSON values to an archive file (`history.jsonl`). Not part of
/// the merge set; no envelope validation.
pub fn append_archive(path: &Path, values: &[Value]) -> Result<(), StorageError> {
    if values.is_empty() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for value in values {
        file.write_all(serde_json::to_string(value)?.as_bytes())?;
        file.write_all(b"\n")?;
    }
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
