// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor process control.
//!
//! `start` launches `frayd` detached and waits for its READY handshake;
//! `stop` signals the pid recorded in the lock file; `status` probes the
//! lock.

use crate::context::CliContext;
use crate::exit::ExitError;
use clap::Subcommand;
use fs2::FileExt;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

const READY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Subcommand)]
pub enum DaemonCmd {
    /// Launch the supervisor for this project
    Start,
    /// Stop the running supervisor
    Stop,
    /// Report whether a supervisor is running
    Status,
}

fn daemon_binary() -> PathBuf {
    if let Ok(explicit) = std::env::var("FRAY_DAEMON_BINARY") {
        return PathBuf::from(explicit);
    }
    // Prefer the frayd that shipped next to this fray binary
    if let Ok(current) = std::env::current_exe() {
        if let Some(dir) = current.parent() {
            let sibling = dir.join("frayd");
            if sibling.is_file() {
                return sibling;
            }
        }
    }
    PathBuf::from("frayd")
}

pub fn run(cmd: DaemonCmd) -> Result<(), ExitError> {
    let ctx = CliContext::open()?;
    let lock_path = ctx.project.paths().daemon_lock();

    match cmd {
        DaemonCmd::Start => {
            if is_running(&lock_path) {
                println!("already running");
                return Ok(());
            }
            let project_root = ctx
                .project
                .paths()
                .fray_dir()
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));

            let mut command = Command::new(daemon_binary());
            command
                .arg(&project_root)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::null());
            // Detach: the daemon keeps running after this CLI exits
            #[cfg(unix)]
            {
                use std::os::unix::process::CommandExt;
                command.process_group(0);
            }
            let mut child = command
                .spawn()
                .map_err(|e| ExitError::operational(format!("launching frayd failed: {e}")))?;

            // READY handshake on stdout
            let stdout = child
                .stdout
                .take()
                .ok_or_else(|| ExitError::operational("frayd stdout unavailable"))?;
            let (tx, rx) = std::sync::mpsc::channel();
            std::thread::spawn(move || {
                let mut line = String::new();
                let mut reader = BufReader::new(stdout);
                let _ = reader.read_line(&mut line);
                let _ = tx.send(line);
            });

            let started = Instant::now();
            loop {
                match rx.try_recv() {
                    Ok(line) if line.trim() == "READY" => {
                        println!("daemon started (pid {})", child.id());
                        return Ok(());
                    }
                    Ok(line) => {
                        return Err(ExitError::operational(format!(
                            "unexpected daemon handshake: {}",
                            line.trim()
                        )))
                    }
                    Err(std::sync::mpsc::TryRecvError::Empty) => {
                        if let Ok(Some(status)) = child.try_wait() {
                            return Err(ExitError::operational(format!(
                                "frayd exited during startup with {status}"
                            )));
                        }
                        if started.elapsed() >= READY_TIMEOUT {
                            return Err(ExitError::operational(
                                "daemon did not report READY in time",
                            ));
                        }
                        std::thread::sleep(Duration::from_millis(50));
                    }
                    Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                        return Err(ExitError::operational("daemon closed stdout before READY"))
                    }
                }
            }
        }
        DaemonCmd::Stop => {
            let Some(pid) = recorded_pid(&lock_path) else {
                println!("not running");
                return Ok(());
            };
            if !is_running(&lock_path) {
                println!("not running");
                return Ok(());
            }
            let status = Command::new("kill")
                .args(["-TERM", &pid.to_string()])
                .status()
                .map_err(|e| ExitError::operational(format!("signalling {pid} failed: {e}")))?;
            if !status.success() {
                return Err(ExitError::operational(format!(
                    "kill -TERM {pid} exited with {status}"
                )));
            }
            println!("stopped (pid {pid})");
            Ok(())
        }
        DaemonCmd::Status => {
            if is_running(&lock_path) {
                match recorded_pid(&lock_path) {
                    Some(pid) => println!("running (pid {pid})"),
                    None => println!("running"),
                }
            } else {
                println!("not running");
            }
            Ok(())
        }
    }
}

/// The lock is held iff a daemon process is alive.
fn is_running(lock_path: &std::path::Path) -> bool {
    let Ok(file) = std::fs::OpenOptions::new().write(true).open(lock_path) else {
        return false;
    };
    if file.try_lock_exclusive().is_ok() {
        let _ = fs2::FileExt::unlock(&file);
        false
    } else {
        true
    }
}

fn recorded_pid(lock_path: &std::path::Path) -> Option<u32> {
    std::fs::read_to_string(lock_path)
        .ok()?
        .trim()
        .parse()
        .ok()
}
