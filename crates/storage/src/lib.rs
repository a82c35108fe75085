// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fray-storage: the durable substrate.
//!
//! Per-machine JSONL logs are the source of truth; SQLite is a derived
//! cache. Writers append durably first, then mutate the cache through the
//! same fold that rebuild uses, so read-your-writes holds locally and
//! rebuild is deterministic.

pub mod checksum;
pub mod error;
pub mod log;
pub mod machine;
pub mod paths;
pub mod project;
pub mod rebuild;
pub mod retention;
pub mod runtime;
pub mod store;

pub use checksum::{verify_manifest, write_manifest, ChecksumManifest};
pub use error::StorageError;
pub use log::{scan_log, LogFile, MachineLog, ScannedRecord};
pub use machine::MachineIdentity;
pub use paths::FrayPaths;
pub use project::{init_project, InitOutcome, Project};
pub use rebuild::{rebuild, RebuildReport};
pub use retention::{prune, PruneOptions, PruneReport};
pub use runtime::RuntimeLog;
pub use store::{Applied, NewMessage, Store, ThreadRef};
