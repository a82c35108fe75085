// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::context::CliContext;
use crate::exit::ExitError;
use clap::Subcommand;
use fray_core::{AgentId, HOME_ROOM};
use fray_storage::ThreadRef;

#[derive(Subcommand)]
pub enum QuestionCmd {
    /// Ask a tracked question
    Ask {
        body: String,

        /// Addressee (omit for the room at large)
        #[arg(long)]
        of: Option<String>,

        /// Home to attach the question to
        #[arg(long)]
        home: Option<String>,

        #[arg(long = "as")]
        as_agent: Option<String>,
    },

    /// Answer an open question
    Answer { guid: String, answer: String },

    /// List open questions
    List {
        /// Only questions directed at this agent
        #[arg(long)]
        of: Option<String>,
    },
}

pub fn run(cmd: QuestionCmd) -> Result<(), ExitError> {
    let mut ctx = CliContext::open()?;
    match cmd {
        QuestionCmd::Ask {
            body,
            of,
            home,
            as_agent,
        } => {
            let asked_by = ctx.self_agent(as_agent.as_deref());
            let home = home
                .map(|h| {
                    if h == HOME_ROOM {
                        Ok(HOME_ROOM.to_string())
                    } else {
                        ctx.project
                            .store()
                            .resolve_thread(&ThreadRef(h))
                            .map(|t| t.guid.0)
                    }
                })
                .transpose()?;
            let ts = ctx.ts();
            let question = ctx.project.ask_question(
                &asked_by,
                of.map(|o| AgentId::new(o.to_lowercase())),
                &body,
                home,
                &ctx.id_gen,
                ts,
            )?;
            println!("{}", question.guid);
        }
        QuestionCmd::Answer { guid, answer } => {
            let ts = ctx.ts();
            ctx.project.answer_question(&guid, answer, ts)?;
            println!("ok");
        }
        QuestionCmd::List { of } => {
            for question in ctx.project.store().open_questions(of.as_deref())? {
                let target = question
                    .asked_of
                    .as_ref()
                    .map(|a| format!(" → @{a}"))
                    .unwrap_or_default();
                println!(
                    "{}  @{}{}: {}",
                    question.guid.short(12),
                    question.asked_by,
                    target,
                    question.body
                );
            }
        }
    }
    Ok(())
}
