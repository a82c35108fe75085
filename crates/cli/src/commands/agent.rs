// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::context::CliContext;
use crate::exit::ExitError;
use crate::output;
use clap::{Args, Subcommand};
use fray_core::{
    AgentId, AgentPatch, AgentRecord, Clock, IdGen, IdKind, InvokeConfig, PromptDelivery,
};

#[derive(Subcommand)]
pub enum AgentCmd {
    /// Register an agent in this project
    Register {
        /// Lowercase agent name
        id: String,

        /// Driver executable; registering one makes the agent managed
        #[arg(long)]
        driver: Option<String>,

        #[arg(long)]
        model: Option<String>,

        /// stdin | args
        #[arg(long, default_value = "stdin")]
        prompt_delivery: String,

        /// Done-detection inactivity bound in ms (0 disables)
        #[arg(long, default_value_t = 0)]
        min_checkin_ms: u64,

        /// Hard runtime cap in ms (0 disables)
        #[arg(long, default_value_t = 0)]
        max_runtime_ms: u64,

        #[arg(long)]
        avatar: Option<String>,
    },

    /// List registered agents
    List,

    /// Leave: clears wake conditions per their persist mode
    Bye {
        #[arg(long = "as")]
        as_agent: Option<String>,
    },

    /// Return after `bye`
    Back {
        #[arg(long = "as")]
        as_agent: Option<String>,
    },

    /// Set the short free-form status line
    Status {
        text: String,

        #[arg(long = "as")]
        as_agent: Option<String>,
    },
}

#[derive(Args)]
pub struct HeartbeatArgs {
    #[arg(long = "as")]
    pub as_agent: Option<String>,
}

pub fn heartbeat(args: HeartbeatArgs) -> Result<(), ExitError> {
    let mut ctx = CliContext::open()?;
    let agent = ctx.self_agent(args.as_agent.as_deref());
    let at_ms = ctx.clock.epoch_ms();
    let ts = ctx.ts();
    ctx.project.heartbeat(&agent, at_ms, ts)?;
    Ok(())
}

pub fn run(cmd: AgentCmd) -> Result<(), ExitError> {
    let mut ctx = CliContext::open()?;
    match cmd {
        AgentCmd::Register {
            id,
            driver,
            model,
            prompt_delivery,
            min_checkin_ms,
            max_runtime_ms,
            avatar,
        } => {
            let delivery = match prompt_delivery.as_str() {
                "stdin" => PromptDelivery::Stdin,
                "args" => PromptDelivery::Args,
                other => {
                    return Err(ExitError::Usage(format!(
                        "unknown prompt delivery '{other}'"
                    )))
                }
            };
            let ts = ctx.ts();
            let mut record = AgentRecord::new(
                ctx.id_gen.next(IdKind::User),
                AgentId::new(id.to_lowercase()),
                ts,
            );
            record.avatar = avatar;
            if let Some(driver) = driver {
                let mut invoke = InvokeConfig::new(driver);
                invoke.model = model;
                invoke.prompt_delivery = delivery;
                invoke.min_checkin_ms = min_checkin_ms;
                invoke.max_runtime_ms = max_runtime_ms;
                record.managed = true;
                record.invoke = Some(invoke);
            }
            let agent_id = record.agent_id.clone();
            ctx.project.register_agent(record, ts)?;
            println!("registered {agent_id}");
        }
        AgentCmd::List => {
            for agent in ctx.project.store().list_agents()? {
                println!("{}", output::agent_line(&agent));
            }
        }
        AgentCmd::Bye { as_agent } => {
            let agent = ctx.self_agent(as_agent.as_deref());
            let ts = ctx.ts();
            ctx.project.agent_bye(&agent, ts)?;
            println!("bye {agent}");
        }
        AgentCmd::Back { as_agent } => {
            let agent = ctx.self_agent(as_agent.as_deref());
            let ts = ctx.ts();
            ctx.project.agent_back(&agent, ts)?;
            println!("welcome back {agent}");
        }
        AgentCmd::Status { text, as_agent } => {
            let agent = ctx.self_agent(as_agent.as_deref());
            let ts = ctx.ts();
            ctx.project.update_agent(
                &agent,
                AgentPatch {
                    status: Some(text),
                    last_seen: Some(ts),
                    ..AgentPatch::default()
                },
                ts,
            )?;
            println!("ok");
        }
    }
    Ok(())
}
