// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::context::CliContext;
use crate::exit::ExitError;
use crate::output;
use clap::Subcommand;
use fray_core::{ThreadKind, ThreadPatch, ThreadStatus};
use fray_storage::ThreadRef;

#[derive(Subcommand)]
pub enum ThreadCmd {
    /// Create a thread
    New {
        /// Lowercase slash-path name (e.g. `design/api`)
        name: String,

        #[arg(long)]
        parent: Option<String>,

        /// standard | knowledge | system
        #[arg(long, default_value = "standard")]
        kind: String,

        #[arg(long = "as")]
        as_agent: Option<String>,
    },

    /// List threads
    List,

    /// Archive a thread
    Archive { reference: String },

    /// Set the thread owner (spawn-triggering rights)
    Own {
        reference: String,
        owner: String,
    },

    /// Subscribe to a thread
    Subscribe {
        reference: String,

        #[arg(long = "as")]
        as_agent: Option<String>,
    },

    /// Drop a thread subscription
    Unsubscribe {
        reference: String,

        #[arg(long = "as")]
        as_agent: Option<String>,
    },

    /// Set or clear the TL;DR anchor
    Anchor {
        reference: String,

        /// Message to anchor; omit with --clear
        message: Option<String>,

        #[arg(long)]
        clear: bool,

        /// Suppress the anchor in the parent view
        #[arg(long)]
        hidden: bool,
    },
}

fn parse_kind(kind: &str) -> Result<ThreadKind, ExitError> {
    match kind {
        "standard" => Ok(ThreadKind::Standard),
        "knowledge" => Ok(ThreadKind::Knowledge),
        "system" => Ok(ThreadKind::System),
        other => Err(ExitError::Usage(format!("unknown thread kind '{other}'"))),
    }
}

pub fn run(cmd: ThreadCmd) -> Result<(), ExitError> {
    let mut ctx = CliContext::open()?;
    match cmd {
        ThreadCmd::New {
            name,
            parent,
            kind,
            as_agent,
        } => {
            let creator = ctx.self_agent(as_agent.as_deref());
            let kind = parse_kind(&kind)?;
            let parent_ref = parent.map(ThreadRef);
            let ts = ctx.ts();
            let thread = ctx.project.create_thread(
                &name,
                parent_ref.as_ref(),
                kind,
                &creator,
                &ctx.id_gen,
                ts,
            )?;
            println!("{}", thread.guid);
        }
        ThreadCmd::List => {
            for thread in ctx.project.store().list_threads()? {
                println!("{}", output::thread_line(&thread));
            }
        }
        ThreadCmd::Archive { reference } => {
            let ts = ctx.ts();
            ctx.project.update_thread(
                &ThreadRef(reference),
                ThreadPatch {
                    status: Some(ThreadStatus::Archived),
                    ..ThreadPatch::default()
                },
                ts,
            )?;
            println!("ok");
        }
        ThreadCmd::Own { reference, owner } => {
            let ts = ctx.ts();
            ctx.project.update_thread(
                &ThreadRef(reference),
                ThreadPatch {
                    owner_agent: Some(fray_core::AgentId::new(owner.to_lowercase())),
                    ..ThreadPatch::default()
                },
                ts,
            )?;
            println!("ok");
        }
        ThreadCmd::Subscribe {
            reference,
            as_agent,
        } => {
            let agent = ctx.self_agent(as_agent.as_deref());
            let ts = ctx.ts();
            ctx.project
                .subscribe(&agent, &ThreadRef(reference), false, ts)?;
            println!("ok");
        }
        ThreadCmd::Unsubscribe {
            reference,
            as_agent,
        } => {
            let agent = ctx.self_agent(as_agent.as_deref());
            let ts = ctx.ts();
            ctx.project
                .subscribe(&agent, &ThreadRef(reference), true, ts)?;
            println!("ok");
        }
        ThreadCmd::Anchor {
            reference,
            message,
            clear,
            hidden,
        } => {
            let patch = if clear {
                ThreadPatch {
                    clear_anchor: true,
                    ..ThreadPatch::default()
                }
            } else {
                let Some(message) = message else {
                    return Err(ExitError::Usage(
                        "anchor requires a message id or --clear".to_string(),
                    ));
                };
                let id = ctx.project.store().resolve_message(&message)?;
                ThreadPatch {
                    anchor_message_guid: Some(id),
                    anchor_hidden: Some(hidden),
                    ..ThreadPatch::default()
                }
            };
            let ts = ctx.ts();
            ctx.project.update_thread(&ThreadRef(reference), patch, ts)?;
            println!("ok");
        }
    }
    Ok(())
}
