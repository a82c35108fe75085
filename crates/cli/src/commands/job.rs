// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::context::CliContext;
use crate::exit::ExitError;
use clap::Subcommand;
use fray_core::JobStatus;

#[derive(Subcommand)]
pub enum JobCmd {
    /// Create a job with a coordination thread
    Create {
        name: String,

        /// Opaque JSON context handed to workers
        #[arg(long)]
        context: Option<String>,

        #[arg(long = "as")]
        as_agent: Option<String>,
    },

    /// List jobs
    List,

    /// Join a job as worker `<base>[<suffix>-<idx>]`
    Join {
        job: String,
        base: String,
        idx: u32,
    },

    /// Close a job
    Close {
        job: String,

        /// completed | cancelled | failed
        #[arg(long, default_value = "completed")]
        status: String,
    },
}

pub fn run(cmd: JobCmd) -> Result<(), ExitError> {
    let mut ctx = CliContext::open()?;
    match cmd {
        JobCmd::Create {
            name,
            context,
            as_agent,
        } => {
            let owner = ctx.self_agent(as_agent.as_deref());
            let context = context
                .map(|raw| {
                    serde_json::from_str(&raw)
                        .map_err(|e| ExitError::Usage(format!("invalid --context JSON: {e}")))
                })
                .transpose()?;
            let ts = ctx.ts();
            let job = ctx
                .project
                .create_job(&name, &owner, context, &ctx.id_gen, ts)?;
            println!("{}", job.guid);
        }
        JobCmd::List => {
            for job in ctx.project.store().list_jobs()? {
                let workers = ctx.project.store().job_workers(&job.guid)?;
                println!(
                    "{}  {}  {}  {} workers",
                    job.guid.short(12),
                    job.name,
                    job.status,
                    workers.len()
                );
            }
        }
        JobCmd::Join { job, base, idx } => {
            let job = ctx.project.store().get_job(&job)?;
            if !job.is_open() {
                return Err(ExitError::operational(format!(
                    "job {} is {}",
                    job.guid, job.status
                )));
            }
            let ts = ctx.ts();
            let worker = ctx
                .project
                .job_worker_join(&job.guid, &base.to_lowercase(), idx, ts)?;
            println!("{worker}");
        }
        JobCmd::Close { job, status } => {
            let status = match status.as_str() {
                "completed" => JobStatus::Completed,
                "cancelled" => JobStatus::Cancelled,
                "failed" => JobStatus::Failed,
                other => {
                    return Err(ExitError::Usage(format!("unknown job status '{other}'")))
                }
            };
            let job = ctx.project.store().get_job(&job)?;
            let ts = ctx.ts();
            ctx.project.close_job(&job.guid, status, ts)?;
            println!("ok");
        }
    }
    Ok(())
}
