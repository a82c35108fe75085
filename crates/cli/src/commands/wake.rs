// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::context::CliContext;
use crate::exit::ExitError;
use clap::Subcommand;
use fray_core::{AgentId, IdGen, IdKind, PersistMode, WakeCondition, WakeId, WakeType};
use fray_storage::ThreadRef;

#[derive(Subcommand)]
pub enum WakeCmd {
    /// Arm a wake condition for an agent
    Set {
        /// Whom to wake
        agent: String,

        /// on_mention | after | pattern | prompt
        #[arg(long = "type", default_value = "on_mention")]
        wake_type: String,

        /// Regex for pattern conditions
        #[arg(long)]
        pattern: Option<String>,

        /// Only messages from these authors (on_mention)
        #[arg(long)]
        on: Vec<String>,

        /// Scope to one thread
        #[arg(long)]
        thread: Option<String>,

        /// Delay for after conditions, in seconds
        #[arg(long, default_value_t = 0)]
        after_secs: u64,

        /// Ask the LLM router before spawning on a pattern match
        #[arg(long)]
        router: bool,

        /// Evaluator prompt (prompt conditions, or pattern+router)
        #[arg(long)]
        prompt: Option<String>,

        /// Poll cadence for prompt conditions, in seconds (min 60)
        #[arg(long, default_value_t = 60)]
        poll_secs: u64,

        /// none | persist | persist_until_bye | persist_restore_on_back
        #[arg(long, default_value = "none")]
        persist: String,

        #[arg(long = "as")]
        as_agent: Option<String>,
    },

    /// List wake conditions
    List {
        #[arg(long)]
        agent: Option<String>,
    },

    /// Pause a condition
    Pause { id: String },

    /// Resume a paused condition
    Resume { id: String },

    /// Clear a condition
    Clear { id: String },
}

fn parse_wake_type(s: &str) -> Result<WakeType, ExitError> {
    match s {
        "on_mention" => Ok(WakeType::OnMention),
        "after" => Ok(WakeType::After),
        "pattern" => Ok(WakeType::Pattern),
        "prompt" => Ok(WakeType::Prompt),
        other => Err(ExitError::Usage(format!("unknown wake type '{other}'"))),
    }
}

fn parse_persist(s: &str) -> Result<PersistMode, ExitError> {
    match s {
        "none" => Ok(PersistMode::None),
        "persist" => Ok(PersistMode::Persist),
        "persist_until_bye" => Ok(PersistMode::PersistUntilBye),
        "persist_restore_on_back" => Ok(PersistMode::PersistRestoreOnBack),
        other => Err(ExitError::Usage(format!("unknown persist mode '{other}'"))),
    }
}

pub fn run(cmd: WakeCmd) -> Result<(), ExitError> {
    let mut ctx = CliContext::open()?;
    match cmd {
        WakeCmd::Set {
            agent,
            wake_type,
            pattern,
            on,
            thread,
            after_secs,
            router,
            prompt,
            poll_secs,
            persist,
            as_agent,
        } => {
            let wake_type = parse_wake_type(&wake_type)?;
            let persist_mode = parse_persist(&persist)?;
            if wake_type == WakeType::Pattern && pattern.is_none() {
                return Err(ExitError::Usage(
                    "pattern conditions require --pattern".to_string(),
                ));
            }
            if wake_type == WakeType::After && after_secs == 0 {
                return Err(ExitError::Usage(
                    "after conditions require --after-secs".to_string(),
                ));
            }
            if wake_type == WakeType::Prompt && prompt.is_none() {
                return Err(ExitError::Usage(
                    "prompt conditions require --prompt".to_string(),
                ));
            }

            let in_thread = thread
                .map(|reference| {
                    ctx.project
                        .store()
                        .resolve_thread(&ThreadRef(reference))
                        .map(|t| t.guid)
                })
                .transpose()?;

            let set_by = ctx.self_agent(as_agent.as_deref());
            let ts = ctx.ts();
            let condition = WakeCondition {
                guid: WakeId::new(ctx.id_gen.next(IdKind::Wake)),
                agent_id: AgentId::new(agent.to_lowercase()),
                set_by,
                wake_type,
                pattern,
                on_agents: on.into_iter().map(AgentId::new).collect(),
                in_thread,
                after_ms: after_secs * 1000,
                use_router: router,
                prompt_text: prompt,
                poll_interval_ms: poll_secs * 1000,
                last_polled_at: ts,
                persist_mode,
                paused: false,
                created_at: ts,
                expires_at: (wake_type == WakeType::After)
                    .then(|| ts + after_secs as i64),
            };
            let guid = condition.guid.clone();
            ctx.project.set_wake_condition(condition, ts)?;
            println!("{guid}");
        }
        WakeCmd::List { agent } => {
            for condition in ctx
                .project
                .store()
                .list_wake_conditions(agent.as_deref())?
            {
                let mut line = format!(
                    "{}  {}  {}",
                    condition.guid.short(12),
                    condition.agent_id,
                    condition.wake_type
                );
                if let Some(pattern) = &condition.pattern {
                    line.push_str(&format!("  /{pattern}/"));
                }
                if condition.paused {
                    line.push_str("  (paused)");
                }
                println!("{line}");
            }
        }
        WakeCmd::Pause { id } => {
            let condition = ctx.project.store().get_wake_condition(&id)?;
            let ts = ctx.ts();
            ctx.project.pause_wake_condition(&condition.guid, ts)?;
            println!("ok");
        }
        WakeCmd::Resume { id } => {
            let condition = ctx.project.store().get_wake_condition(&id)?;
            let ts = ctx.ts();
            ctx.project.resume_wake_condition(&condition.guid, ts)?;
            println!("ok");
        }
        WakeCmd::Clear { id } => {
            let condition = ctx.project.store().get_wake_condition(&id)?;
            let ts = ctx.ts();
            ctx.project.delete_wake_condition(&condition.guid, ts)?;
            println!("ok");
        }
    }
    Ok(())
}
