// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::exit::ExitError;
use clap::Args;
use fray_core::{Clock, SystemClock, UlidGen};
use fray_storage::{init_project, InitOutcome};

#[derive(Args)]
pub struct InitArgs {
    /// Machine id, locally unique across the project (default: hostname)
    #[arg(long)]
    pub machine: Option<String>,

    /// Channel name for a fresh project (default: directory name)
    #[arg(long)]
    pub channel: Option<String>,
}

fn hostname() -> String {
    std::process::Command::new("hostname")
        .output()
        .ok()
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "local".to_string())
}

pub fn run(args: InitArgs) -> Result<(), ExitError> {
    let cwd = std::env::current_dir()?;
    let machine = args.machine.unwrap_or_else(hostname);
    let channel = args.channel.unwrap_or_else(|| {
        cwd.file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "fray".to_string())
    });

    let clock = SystemClock;
    let outcome = init_project(&cwd, &machine, &channel, &UlidGen, clock.unix_ts())?;
    match outcome {
        InitOutcome::CreatedFresh => {
            println!("initialized fresh project '{channel}' on machine '{machine}'")
        }
        InitOutcome::JoinedExisting => println!("joined existing project as machine '{machine}'"),
        InitOutcome::AlreadyInitialized => println!("already initialized"),
    }
    Ok(())
}
