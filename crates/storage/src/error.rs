// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage error kinds.
//!
//! Durability errors on the write path propagate to the caller before any
//! SQLite mutation; the cache never claims a state the log does not
//! reflect.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{kind} not found: {reference}")]
    NotFound { kind: &'static str, reference: String },

    #[error("ambiguous {kind} reference '{reference}': matches {}", candidates.join(", "))]
    Ambiguous {
        kind: &'static str,
        reference: String,
        candidates: Vec<String>,
    },

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("{0}")]
    GuardRejection(String),

    #[error("storage version {found} is read-only; migrate the project to version {required}")]
    StorageVersion { found: u32, required: u32 },

    #[error("corrupt record in {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StorageError {
    pub fn not_found(kind: &'static str, reference: impl Into<String>) -> Self {
        StorageError::NotFound {
            kind,
            reference: reference.into(),
        }
    }

    pub fn ambiguous(
        kind: &'static str,
        reference: impl Into<String>,
        candidates: Vec<String>,
    ) -> Self {
        StorageError::Ambiguous {
            kind,
            reference: reference.into(),
            candidates,
        }
    }
}
