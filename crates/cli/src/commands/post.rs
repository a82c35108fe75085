// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fray post`: classify mentions, encode for multi-machine routing,
//! persist. Ambiguous mentions reject the post before anything lands in
//! the log.

use crate::context::CliContext;
use crate::exit::ExitError;
use clap::Args;
use fray_core::{MessageKind, HOME_ROOM};
use fray_engine::{classify, encode_mentions, ClassifyContext};
use fray_storage::{NewMessage, ThreadRef};

#[derive(Args)]
pub struct PostArgs {
    /// Message body; may contain @mentions and markdown
    pub body: String,

    /// Target home: thread GUID, GUID prefix, name, or `room`
    #[arg(long, default_value = HOME_ROOM)]
    pub home: String,

    /// Reply to a message (full id or unique prefix)
    #[arg(long)]
    pub reply_to: Option<String>,

    /// Act as this agent instead of $FRAY_AGENT_ID
    #[arg(long = "as")]
    pub as_agent: Option<String>,

    /// Post as an event notice rather than a user message
    #[arg(long)]
    pub event: bool,

    /// Override the posted-in-wrong-home reminder
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: PostArgs) -> Result<(), ExitError> {
    let mut ctx = CliContext::open()?;
    let from_agent = ctx.self_agent(args.as_agent.as_deref());

    let home = if args.home == HOME_ROOM {
        HOME_ROOM.to_string()
    } else {
        ctx.project
            .store()
            .resolve_thread(&ThreadRef(args.home.clone()))?
            .guid
            .0
    };

    // Guard: a daemon-spawned agent posting outside its trigger home is
    // usually a mistake
    if !args.force {
        if let Some(trigger_home) = ctx.trigger_home() {
            if trigger_home != home {
                return Err(ExitError::Guard(format!(
                    "you were woken in '{trigger_home}' but are posting to '{home}'; \
                     pass --force to post anyway"
                )));
            }
        }
    }

    // Classify against current agents; reject ambiguity at post time
    let agents = ctx.project.store().list_agents()?;
    let reply_authors = match &args.reply_to {
        Some(reference) => {
            let id = ctx.project.store().resolve_message(reference)?;
            let parent = ctx.project.store().get_message(id.as_str())?;
            let mut authors = vec![parent.from_agent.to_string()];
            authors.extend(ctx.project.store().reply_chain_authors(&parent, 4)?);
            authors
        }
        None => Vec::new(),
    };
    let machine = ctx.project.machine_id().as_str().to_string();
    let classification = classify(
        &args.body,
        &ClassifyContext {
            from_agent: from_agent.as_str(),
            reply_chain_authors: &reply_authors,
            agents: &agents,
            machine: &machine,
        },
    );

    if classification.is_ambiguous() {
        let detail = classification
            .diagnostics
            .iter()
            .map(|d| format!("@{} matches {}", d.mention, d.candidates.join(", ")))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ExitError::operational(format!(
            "ambiguous mention: {detail}"
        )));
    }

    let machine_id = ctx.project.machine_id().clone();
    let encoded_body = encode_mentions(&args.body, &machine_id);

    let mut draft = NewMessage::in_home(home, from_agent, encoded_body);
    draft.kind = if args.event {
        MessageKind::Event
    } else {
        MessageKind::User
    };
    draft.reply_to = args.reply_to.clone();
    draft.mentions = classification.mention_list();
    draft.fork_sessions = classification.fork_sessions.clone();
    draft.session_id = ctx.driver_session();

    let ts = ctx.ts();
    let message = ctx.project.post_message(draft, &ctx.id_gen, ts)?;
    println!("{}", message.id);
    Ok(())
}

#[cfg(test)]
#[path = "post_tests.rs"]
mod tests;
