// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fray-adapters: boundaries to the outside world.
//!
//! Driver subprocess management, the LLM router executable, and the
//! filesystem watcher. Each adapter has a fake counterpart behind the
//! `test-support` feature so the engine and daemon test hermetically.

pub mod driver;
pub mod router;
pub mod watcher;

pub use driver::{DriverAdapter, DriverError, DriverHandle, LaunchSpec, ProcessDriverAdapter};
pub use router::{ExecRouterAdapter, RouterAdapter, RouterError, RouterVerdict};
pub use watcher::{FsWatcher, WatcherError};

#[cfg(any(test, feature = "test-support"))]
pub use driver::fake::FakeDriverAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use router::FakeRouterAdapter;
