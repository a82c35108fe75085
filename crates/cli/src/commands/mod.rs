// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command tree and dispatch.

pub mod agent;
pub mod daemon;
pub mod init;
pub mod job;
pub mod message;
pub mod post;
pub mod prune;
pub mod question;
pub mod status;
pub mod thread;
pub mod wake;

use crate::context::CliContext;
use crate::exit::ExitError;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Command {
    /// Create or join a project in the current directory
    Init(init::InitArgs),

    /// Post a message to the room or a thread
    Post(post::PostArgs),

    /// Edit a message you authored
    Edit(message::EditArgs),

    /// Add or remove an emoji reaction
    React(message::ReactArgs),

    /// Pin a message in a thread
    Pin(message::PinArgs),

    /// Unpin a message from a thread
    Unpin(message::PinArgs),

    /// Favorite a message
    Fave(message::FaveArgs),

    /// Remove a favorite
    Unfave(message::FaveArgs),

    /// Move a message to another home
    Move(message::MoveArgs),

    /// Delete a message (leaves a sticky tombstone)
    Delete(message::DeleteArgs),

    /// Record a read position
    Read(message::ReadArgs),

    /// List messages in a home
    Log(message::LogArgs),

    /// Thread management
    #[command(subcommand)]
    Thread(thread::ThreadCmd),

    /// Agent registration and presence
    #[command(subcommand)]
    Agent(agent::AgentCmd),

    /// Record a heartbeat for the current agent (driver hook point)
    Heartbeat(agent::HeartbeatArgs),

    /// Wake conditions
    #[command(subcommand)]
    Wake(wake::WakeCmd),

    /// Tracked questions
    #[command(subcommand)]
    Question(question::QuestionCmd),

    /// Jobs and ephemeral workers
    #[command(subcommand)]
    Job(job::JobCmd),

    /// Prune a thread with integrity preserves
    Prune(prune::PruneArgs),

    /// Rebuild the cache from the logs
    Rebuild,

    /// Supervisor process control
    #[command(subcommand)]
    Daemon(daemon::DaemonCmd),

    /// Project overview
    Status,
}

pub fn run(command: Command) -> Result<(), ExitError> {
    match command {
        Command::Init(args) => init::run(args),
        Command::Post(args) => post::run(args),
        Command::Edit(args) => message::edit(args),
        Command::React(args) => message::react(args),
        Command::Pin(args) => message::pin(args, false),
        Command::Unpin(args) => message::pin(args, true),
        Command::Fave(args) => message::fave(args, false),
        Command::Unfave(args) => message::fave(args, true),
        Command::Move(args) => message::move_message(args),
        Command::Delete(args) => message::delete(args),
        Command::Read(args) => message::read_to(args),
        Command::Log(args) => message::log(args),
        Command::Thread(cmd) => thread::run(cmd),
        Command::Agent(cmd) => agent::run(cmd),
        Command::Heartbeat(args) => agent::heartbeat(args),
        Command::Wake(cmd) => wake::run(cmd),
        Command::Question(cmd) => question::run(cmd),
        Command::Job(cmd) => job::run(cmd),
        Command::Prune(args) => prune::run(args),
        Command::Rebuild => {
            let mut ctx = CliContext::open()?;
            let ts = ctx.ts();
            let report = ctx.project.rebuild(ts)?;
            println!(
                "rebuilt: {} records, {} collisions",
                report.records,
                report.collisions.len()
            );
            Ok(())
        }
        Command::Daemon(cmd) => daemon::run(cmd),
        Command::Status => status::run(),
    }
}
