// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::context::CliContext;
use crate::exit::ExitError;
use clap::Args;
use fray_storage::{prune, PruneOptions, ThreadRef};

#[derive(Args)]
pub struct PruneArgs {
    /// Thread to prune (GUID, prefix, or name), or `room`
    pub thread: String,

    /// Keep the N most recent messages
    #[arg(long, default_value_t = 50)]
    pub keep: usize,

    /// Clear the home entirely (protections still apply)
    #[arg(long = "all")]
    pub prune_all: bool,

    #[arg(long)]
    pub no_protect_replies: bool,

    #[arg(long)]
    pub no_protect_faves: bool,

    #[arg(long)]
    pub no_protect_reacts: bool,

    /// Skip the quiesce guardrail
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: PruneArgs) -> Result<(), ExitError> {
    let mut ctx = CliContext::open()?;
    let options = PruneOptions {
        keep: args.keep,
        prune_all: args.prune_all,
        protect_replies: !args.no_protect_replies,
        protect_faves: !args.no_protect_faves,
        protect_reacts: !args.no_protect_reacts,
        force: args.force,
    };
    let ts = ctx.ts();
    let report = prune(
        &mut ctx.project,
        &ThreadRef(args.thread.clone()),
        &options,
        &ctx.id_gen,
        ts,
    )?;
    match report.tombstone {
        Some(tombstone) => println!(
            "pruned {} messages, retained {}; summary at {}",
            report.pruned, report.retained, tombstone
        ),
        None => println!("nothing to prune"),
    }
    Ok(())
}
