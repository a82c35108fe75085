// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: singleton lock, logging, startup, shutdown.

use crate::supervisor::{Supervisor, SupervisorError, Timeouts};
use fray_adapters::{ExecRouterAdapter, FsWatcher, ProcessDriverAdapter};
use fray_core::{Clock, SystemClock};
use fray_storage::{FrayPaths, Project, StorageError};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("another daemon holds the lock at {0}")]
    AlreadyRunning(PathBuf),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    #[error("watcher failed: {0}")]
    Watcher(#[from] fray_adapters::WatcherError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolved daemon configuration for one project.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub project_root: PathBuf,
    pub lock_path: PathBuf,
    pub log_path: PathBuf,
    pub timeouts: Timeouts,
}

impl DaemonConfig {
    pub fn for_project(project_root: &Path) -> Result<Self, LifecycleError> {
        let paths = FrayPaths::discover(project_root).ok_or_else(|| {
            LifecycleError::Storage(StorageError::NotFound {
                kind: "project",
                reference: project_root.display().to_string(),
            })
        })?;
        Ok(Self {
            project_root: project_root.to_owned(),
            lock_path: paths.daemon_lock(),
            log_path: paths.daemon_log(),
            timeouts: Timeouts::default(),
        })
    }
}

/// Held for the daemon's lifetime; the advisory lock releases on drop.
#[derive(Debug)]
pub struct DaemonLock {
    // NOTE(lifetime): field keeps the lock; never read
    #[allow(dead_code)]
    file: File,
}

/// Take the singleton lock and record our pid.
pub fn acquire_lock(path: &Path) -> Result<DaemonLock, LifecycleError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)?;
    if file.try_lock_exclusive().is_err() {
        return Err(LifecycleError::AlreadyRunning(path.to_owned()));
    }
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;
    file.sync_all()?;
    Ok(DaemonLock { file })
}

/// Start the daemon over a project and run until the watcher dies or the
/// task is cancelled. Prints `READY` on stdout once serving, so a parent
/// CLI can detach.
pub async fn run(config: DaemonConfig) -> Result<(), LifecycleError> {
    let _lock = acquire_lock(&config.lock_path)?;

    let clock = SystemClock;
    let project = Project::discover(&config.project_root, clock.unix_ts())?;
    let paths = project.paths().clone();

    let router = ExecRouterAdapter::new(paths.routers_dir().join("default"));
    let driver = ProcessDriverAdapter::new();
    let supervisor = Supervisor::new(
        project,
        driver,
        router,
        clock,
        config.timeouts.clone(),
    )?;

    let (wake_tx, wake_rx) = tokio::sync::mpsc::channel(1);
    let _watcher = FsWatcher::spawn(&paths.shared(), wake_tx)?;

    info!(project = %config.project_root.display(), "daemon ready");
    println!("READY");

    supervisor.run(wake_rx).await?;
    Ok(())
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
