// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fray_core::{worker_agent_id, Envelope, Event, MachineId};

fn env(seq: u64, event: Event) -> Envelope {
    Envelope::new(1_700_000_000 + seq as i64, MachineId::new("m1"), seq, event)
}

fn job(guid: &str, name: &str) -> Job {
    Job {
        guid: JobId::new(guid),
        name: name.to_string(),
        context: Some(serde_json::json!({"target": "backfill"})),
        owner_agent: AgentId::new("alice"),
        status: JobStatus::Running,
        thread_guid: Some(ThreadId::new("thrd-000000000001")),
        created_at: 1_700_000_000,
        completed_at: None,
    }
}

#[test]
fn create_close_round_trip() {
    let store = Store::open_in_memory().unwrap();
    store
        .apply_envelope(&env(
            1,
            Event::JobCreated {
                job: job("job-ab12cd34ef56", "backfill"),
            },
        ))
        .unwrap();

    let fetched = store.get_job("job-ab12cd34ef56").unwrap();
    assert!(fetched.is_open());
    assert_eq!(fetched.context.unwrap()["target"], "backfill");

    store
        .apply_envelope(&env(
            2,
            Event::JobUpdated {
                id: JobId::new("job-ab12cd34ef56"),
                status: Some(JobStatus::Completed),
                completed_at: Some(1_700_000_200),
            },
        ))
        .unwrap();

    let fetched = store.get_job("job-ab12cd34ef56").unwrap();
    assert_eq!(fetched.status, JobStatus::Completed);
    assert_eq!(fetched.completed_at, Some(1_700_000_200));
    assert!(store.open_jobs().unwrap().is_empty());
}

#[test]
fn workers_listed_by_index() {
    let store = Store::open_in_memory().unwrap();
    let job_id = JobId::new("job-ab12cd34ef56");
    store
        .apply_envelope(&env(
            1,
            Event::JobCreated {
                job: job("job-ab12cd34ef56", "backfill"),
            },
        ))
        .unwrap();
    for idx in [1u32, 0] {
        store
            .apply_envelope(&env(
                2 + idx as u64,
                Event::JobWorkerJoined {
                    job: job_id.clone(),
                    agent_id: worker_agent_id("dev", &job_id, idx),
                    idx,
                },
            ))
            .unwrap();
    }

    let workers = store.job_workers(&job_id).unwrap();
    let ids: Vec<&str> = workers.iter().map(|w| w.agent_id.as_str()).collect();
    assert_eq!(ids, vec!["dev[ab12-0]", "dev[ab12-1]"]);
    assert!(workers.iter().all(|w| w.is_ephemeral));
}
