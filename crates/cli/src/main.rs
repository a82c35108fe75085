// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fray: message, thread, and agent commands over a `.fray/` project.

mod commands;
mod context;
mod exit;
mod output;

use clap::Parser;
use exit::ExitError;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fray", version, about = "Multi-agent coordination substrate")]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FRAY_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // clap renders help/version through the error path too
            let code = if e.use_stderr() { 64 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    match commands::run(cli.command) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("fray: {e}");
            std::process::exit(e.code());
        }
    }
}
