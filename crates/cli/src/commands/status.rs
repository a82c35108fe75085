// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::context::CliContext;
use crate::exit::ExitError;
use fray_core::HOME_ROOM;

pub fn run() -> Result<(), ExitError> {
    let ctx = CliContext::open()?;
    let store = ctx.project.store();
    let config = ctx.project.config();

    println!(
        "channel: {} ({})",
        config.channel_name,
        config.channel_id.short(12)
    );
    println!("machine: {}", ctx.project.machine_id());

    let agents = store.list_agents()?;
    let managed = agents.iter().filter(|a| a.managed).count();
    println!("agents: {} ({} managed)", agents.len(), managed);

    let threads = store.list_threads()?;
    let open = threads
        .iter()
        .filter(|t| t.status == fray_core::ThreadStatus::Open)
        .count();
    println!("threads: {} ({} open)", threads.len(), open);

    let room = store.home_messages(HOME_ROOM)?;
    println!("room messages: {}", room.len());

    let jobs = store.open_jobs()?;
    if !jobs.is_empty() {
        println!("open jobs: {}", jobs.len());
    }

    let conditions = store.list_wake_conditions(None)?;
    if !conditions.is_empty() {
        let paused = conditions.iter().filter(|c| c.paused).count();
        println!("wake conditions: {} ({} paused)", conditions.len(), paused);
    }
    Ok(())
}
