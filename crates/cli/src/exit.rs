// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exit-code policy.
//!
//! `0` success, `1` operational failure, `2` pre-command guard rejection
//! (override with `--force`), `64` user-input syntax error.

use fray_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExitError {
    #[error("{0}")]
    Operational(String),

    #[error("{0}")]
    Guard(String),

    #[error("{0}")]
    Usage(String),
}

impl ExitError {
    pub fn code(&self) -> i32 {
        match self {
            ExitError::Operational(_) => 1,
            ExitError::Guard(_) => 2,
            ExitError::Usage(_) => 64,
        }
    }

    pub fn operational(message: impl Into<String>) -> Self {
        ExitError::Operational(message.into())
    }
}

impl From<StorageError> for ExitError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::GuardRejection(message) => ExitError::Guard(message),
            other => ExitError::Operational(other.to_string()),
        }
    }
}

impl From<std::io::Error> for ExitError {
    fn from(e: std::io::Error) -> Self {
        ExitError::Operational(e.to_string())
    }
}

#[cfg(test)]
#[path = "exit_tests.rs"]
mod tests;
