// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! frayd: the Fray session supervisor.
//!
//! Usage: `frayd [project-dir]`. Runs in the foreground; the `fray
//! daemon start` command detaches it. Logs go to
//! `.fray/local/daemon.log`.

use fray_daemon::lifecycle::{self, DaemonConfig, LifecycleError};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!("usage: frayd [project-dir]");
    std::process::exit(64);
}

#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1);
    let project_root = match args.next() {
        Some(flag) if flag == "--help" || flag == "-h" => usage(),
        Some(dir) => PathBuf::from(dir),
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("frayd: cannot determine working directory: {e}");
                std::process::exit(1);
            }
        },
    };
    if args.next().is_some() {
        usage();
    }

    let config = match DaemonConfig::for_project(&project_root) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("frayd: {e}");
            std::process::exit(1);
        }
    };

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().unwrap_or(&project_root),
        config
            .log_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "daemon.log".to_string()),
    );
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FRAY_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let result = tokio::select! {
        result = lifecycle::run(config) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received, exiting");
            Ok(())
        }
    };

    match result {
        Ok(()) => {}
        Err(LifecycleError::AlreadyRunning(path)) => {
            eprintln!("frayd: already running (lock at {})", path.display());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("frayd: {e}");
            std::process::exit(1);
        }
    }
}
