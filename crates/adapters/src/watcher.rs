// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem change watcher over the shared tree.
//!
//! Change bursts (a sync dropping many files at once) coalesce into the
//! daemon's single-slot wake channel; the daemon treats any signal as
//! "something changed, re-scan".

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("watch failed: {0}")]
    Notify(#[from] notify::Error),
}

/// Keeps the underlying watcher alive; dropping it stops notifications.
pub struct FsWatcher {
    _watcher: RecommendedWatcher,
}

impl FsWatcher {
    /// Watch `path` recursively, signalling `tx` on any content change.
    pub fn spawn(path: &Path, tx: mpsc::Sender<()>) -> Result<Self, WatcherError> {
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            match result {
                Ok(event) => {
                    if matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    ) {
                        // Full channel means a wake is already pending
                        let _ = tx.try_send(());
                    }
                }
                Err(e) => warn!(error = %e, "watcher error"),
            }
        })?;
        watcher.watch(path, RecursiveMode::Recursive)?;
        debug!(path = %path.display(), "watching for changes");
        Ok(Self { _watcher: watcher })
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
