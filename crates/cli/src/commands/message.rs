// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message-level commands: edit, react, pin, fave, move, delete, read,
//! log.

use crate::context::CliContext;
use crate::exit::ExitError;
use crate::output;
use clap::Args;
use fray_core::HOME_ROOM;
use fray_storage::{Applied, ThreadRef};

#[derive(Args)]
pub struct EditArgs {
    /// Message id or unique prefix
    pub reference: String,
    pub body: String,

    #[arg(long = "as")]
    pub as_agent: Option<String>,

    /// Edit a message authored by someone else (trust capability)
    #[arg(long)]
    pub trusted: bool,
}

pub fn edit(args: EditArgs) -> Result<(), ExitError> {
    let mut ctx = CliContext::open()?;
    let editor = ctx.self_agent(args.as_agent.as_deref());
    let ts = ctx.ts();
    let message = ctx
        .project
        .edit_message(&args.reference, &editor, args.body, args.trusted, ts)?;
    println!("edited {} (edit #{})", message.id, message.edit_count);
    Ok(())
}

#[derive(Args)]
pub struct ReactArgs {
    pub reference: String,
    pub emoji: String,

    #[arg(long)]
    pub remove: bool,

    #[arg(long = "as")]
    pub as_agent: Option<String>,
}

pub fn react(args: ReactArgs) -> Result<(), ExitError> {
    let mut ctx = CliContext::open()?;
    let agent = ctx.self_agent(args.as_agent.as_deref());
    let ts = ctx.ts();
    match ctx
        .project
        .react(&args.reference, &args.emoji, &agent, args.remove, ts)?
    {
        Applied::Changed => println!("ok"),
        _ => println!("not changed"),
    }
    Ok(())
}

#[derive(Args)]
pub struct PinArgs {
    pub reference: String,

    /// Thread to pin in (GUID, prefix, or name)
    #[arg(long)]
    pub thread: String,

    #[arg(long = "as")]
    pub as_agent: Option<String>,
}

pub fn pin(args: PinArgs, unpin: bool) -> Result<(), ExitError> {
    let mut ctx = CliContext::open()?;
    let agent = ctx.self_agent(args.as_agent.as_deref());
    let ts = ctx.ts();
    ctx.project.pin_message(
        &args.reference,
        &ThreadRef(args.thread.clone()),
        &agent,
        unpin,
        ts,
    )?;
    println!("ok");
    Ok(())
}

#[derive(Args)]
pub struct FaveArgs {
    pub reference: String,

    #[arg(long = "as")]
    pub as_agent: Option<String>,
}

pub fn fave(args: FaveArgs, unfave: bool) -> Result<(), ExitError> {
    let mut ctx = CliContext::open()?;
    let agent = ctx.self_agent(args.as_agent.as_deref());
    let ts = ctx.ts();
    ctx.project.fave(&args.reference, &agent, unfave, ts)?;
    println!("ok");
    Ok(())
}

#[derive(Args)]
pub struct MoveArgs {
    pub reference: String,

    /// Destination home: thread reference or `room`
    #[arg(long)]
    pub to: String,

    #[arg(long = "as")]
    pub as_agent: Option<String>,
}

pub fn move_message(args: MoveArgs) -> Result<(), ExitError> {
    let mut ctx = CliContext::open()?;
    let agent = ctx.self_agent(args.as_agent.as_deref());
    let to_home = if args.to == HOME_ROOM {
        HOME_ROOM.to_string()
    } else {
        ctx.project
            .store()
            .resolve_thread(&ThreadRef(args.to.clone()))?
            .guid
            .0
    };
    let ts = ctx.ts();
    ctx.project
        .move_message(&args.reference, to_home, &agent, ts)?;
    println!("ok");
    Ok(())
}

#[derive(Args)]
pub struct DeleteArgs {
    pub reference: String,

    #[arg(long = "as")]
    pub as_agent: Option<String>,
}

pub fn delete(args: DeleteArgs) -> Result<(), ExitError> {
    let mut ctx = CliContext::open()?;
    let agent = ctx.self_agent(args.as_agent.as_deref());
    let ts = ctx.ts();
    let id = ctx.project.delete_message(&args.reference, &agent, ts)?;
    println!("tombstoned {id}");
    Ok(())
}

#[derive(Args)]
pub struct ReadArgs {
    /// Home the position applies to
    pub home: String,
    /// Message read up to
    pub reference: String,

    #[arg(long = "as")]
    pub as_agent: Option<String>,
}

pub fn read_to(args: ReadArgs) -> Result<(), ExitError> {
    let mut ctx = CliContext::open()?;
    let agent = ctx.self_agent(args.as_agent.as_deref());
    let home = if args.home == HOME_ROOM {
        HOME_ROOM.to_string()
    } else {
        ctx.project
            .store()
            .resolve_thread(&ThreadRef(args.home.clone()))?
            .guid
            .0
    };
    let ts = ctx.ts();
    ctx.project.read_to(&agent, &home, &args.reference, ts)?;
    println!("ok");
    Ok(())
}

#[derive(Args)]
pub struct LogArgs {
    /// Home to list: thread reference or `room`
    #[arg(default_value = HOME_ROOM)]
    pub home: String,

    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

pub fn log(args: LogArgs) -> Result<(), ExitError> {
    let ctx = CliContext::open()?;
    let home = if args.home == HOME_ROOM {
        HOME_ROOM.to_string()
    } else {
        ctx.project
            .store()
            .resolve_thread(&ThreadRef(args.home.clone()))?
            .guid
            .0
    };
    let messages = ctx.project.store().home_messages(&home)?;
    let start = messages.len().saturating_sub(args.limit);
    for message in &messages[start..] {
        println!("{}", output::message_line(message));
    }
    Ok(())
}
