// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread-scoped retention: prune with integrity preserves.
//!
//! The retained set is the keep-tail plus every protected message
//! (anchors, faves, reacted-to) plus the upward reply-chain closure of
//! everything retained. The complement is removed from the logs, archived
//! to `local/history.jsonl`, and summarized by a single synthesized
//! tombstone message authored by `system`.

use crate::checksum;
use crate::error::StorageError;
use crate::log::{rewrite_log, scan_log, LogFile};
use crate::project::Project;
use crate::store::ThreadRef;
use fray_core::{
    AgentId, AgentPatch, Envelope, Event, IdGen, IdKind, Message, MessageId, MessageKind,
    HOME_ROOM,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::info;

#[derive(Debug, Clone)]
pub struct PruneOptions {
    /// Keep the N most recent messages in the target home.
    pub keep: usize,
    /// Clear the home entirely (subject to protections).
    pub prune_all: bool,
    pub protect_replies: bool,
    pub protect_faves: bool,
    pub protect_reacts: bool,
    /// Skip the quiesce guardrail.
    pub force: bool,
}

impl Default for PruneOptions {
    fn default() -> Self {
        Self {
            keep: 50,
            prune_all: false,
            protect_replies: true,
            protect_faves: true,
            protect_reacts: true,
            force: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PruneReport {
    pub pruned: usize,
    pub retained: usize,
    pub tombstone: Option<MessageId>,
    pub first_pruned: Option<MessageId>,
    pub last_pruned: Option<MessageId>,
}

/// Prune a thread (or the room), preserving integrity.
pub fn prune<G: IdGen>(
    project: &mut Project,
    target: &ThreadRef,
    opts: &PruneOptions,
    id_gen: &G,
    now: i64,
) -> Result<PruneReport, StorageError> {
    // Guardrail: refuse while the shared tree disagrees with the last
    // quiesced manifest, unless forced
    if !opts.force {
        let mismatched = checksum::verify_manifest(project.paths())?;
        if !mismatched.is_empty() {
            return Err(StorageError::GuardRejection(format!(
                "shared files changed since last quiesce ({}); re-sync or pass --force",
                mismatched.join(", ")
            )));
        }
    }

    let home = if target.0 == HOME_ROOM {
        HOME_ROOM.to_string()
    } else {
        project.store().resolve_thread(target)?.guid.0
    };

    let messages = project.store().home_messages(&home)?;
    let retained = retained_set(project, &messages, opts)?;

    let pruned: Vec<&Message> = messages
        .iter()
        .filter(|m| !retained.contains(m.id.as_str()))
        .collect();

    let mut report = PruneReport {
        pruned: pruned.len(),
        retained: retained.len(),
        ..PruneReport::default()
    };
    if pruned.is_empty() {
        return Ok(report);
    }

    let pruned_ids: HashSet<&str> = pruned.iter().map(|m| m.id.as_str()).collect();
    report.first_pruned = Some(pruned[0].id.clone());
    report.last_pruned = pruned.last().map(|m| m.id.clone());

    // Remove pruned records from every machine's message log, archiving
    // the removed lines. Sticky message_delete records always stay.
    let mut archived = Vec::new();
    for machine in project.paths().list_machines()? {
        let path = project
            .paths()
            .machine_dir(&machine)
            .join(LogFile::Messages.file_name());
        let records = scan_log(&path)?;
        if records.is_empty() {
            continue;
        }
        let mut kept: Vec<Envelope> = Vec::with_capacity(records.len());
        for record in records {
            let envelope = record.envelope;
            let targets_pruned = envelope
                .event()
                .and_then(Event::message_id)
                .is_some_and(|id| pruned_ids.contains(id.as_str()));
            let is_delete = matches!(envelope.event(), Some(Event::MessageDeleted { .. }));
            if targets_pruned && !is_delete {
                archived.push(serde_json::to_value(&envelope)?);
            } else {
                kept.push(envelope);
            }
        }
        rewrite_log(&path, &kept)?;
    }
    crate::log::append_archive(&project.paths().history(), &archived)?;

    // Synthesized tombstone summarizing the removal
    let participants: BTreeSet<&str> = pruned.iter().map(|m| m.from_agent.as_str()).collect();
    let names: Vec<String> = participants.iter().map(|p| format!("@{p}")).collect();
    let body = format!(
        "pruned: {} messages between {} from #{} to #{}",
        pruned.len(),
        names.join(", "),
        report.first_pruned.as_ref().map_or("", |id| id.as_str()),
        report.last_pruned.as_ref().map_or("", |id| id.as_str()),
    );
    let mut tombstone = Message::new(
        MessageId::new(id_gen.next(IdKind::Message)),
        now,
        home.clone(),
        AgentId::new("system"),
        body,
    );
    tombstone.kind = MessageKind::Tombstone;
    tombstone.origin = project.machine_id().clone();
    report.tombstone = Some(tombstone.id.clone());

    // Watermarks that pointed into the pruned set advance to the most
    // recent retained message, which is now the fresh tombstone
    let mut watermark_repairs = Vec::new();
    for agent in project.store().list_agents()? {
        if let Some(watermark) = &agent.mention_watermark {
            if pruned_ids.contains(watermark.as_str()) {
                watermark_repairs.push(agent.agent_id.clone());
            }
        }
    }

    project.append(Event::MessageCreated { message: tombstone }, now)?;
    for agent in watermark_repairs {
        project.update_agent(
            &agent,
            AgentPatch {
                mention_watermark: report.tombstone.as_ref().map(|t| t.0.clone()),
                ..AgentPatch::default()
            },
            now,
        )?;
    }

    // The cache still holds the pruned rows; fold the rewritten logs
    project.rebuild(now)?;

    info!(
        home = %home,
        pruned = report.pruned,
        retained = report.retained,
        "prune complete"
    );
    Ok(report)
}

/// Compute the set of message ids to retain.
fn retained_set(
    project: &Project,
    messages: &[Message],
    opts: &PruneOptions,
) -> Result<HashSet<String>, StorageError> {
    let by_id: HashMap<&str, &Message> =
        messages.iter().map(|m| (m.id.as_str(), m)).collect();
    let mut retained: HashSet<String> = HashSet::new();

    // Keep-tail (ordering is already (ts, id) ascending)
    if !opts.prune_all {
        let tail_start = messages.len().saturating_sub(opts.keep);
        for message in &messages[tail_start..] {
            retained.insert(message.id.0.clone());
        }
    }

    // Existing tombstone summaries stay
    for message in messages {
        if message.is_tombstone() {
            retained.insert(message.id.0.clone());
        }
    }

    // Anchors of any thread that point into this home
    for thread in project.store().list_threads()? {
        if let Some(anchor) = &thread.anchor_message_guid {
            if by_id.contains_key(anchor.as_str()) {
                retained.insert(anchor.0.clone());
            }
        }
    }

    if opts.protect_faves {
        for id in project.store().faved_message_ids()? {
            if by_id.contains_key(id.as_str()) {
                retained.insert(id);
            }
        }
    }
    if opts.protect_reacts {
        for id in project.store().reacted_message_ids()? {
            if by_id.contains_key(id.as_str()) {
                retained.insert(id);
            }
        }
    }

    // Reply-chain closure: every retained reply keeps its ancestors.
    // The visited set breaks cycles formed by cross-machine imports.
    if opts.protect_replies {
        let mut worklist: Vec<String> = retained.iter().cloned().collect();
        let mut visited: HashSet<String> = HashSet::new();
        while let Some(id) = worklist.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            let Some(message) = by_id.get(id.as_str()) else {
                continue;
            };
            if let Some(parent) = &message.reply_to {
                if by_id.contains_key(parent.as_str()) && retained.insert(parent.0.clone()) {
                    worklist.push(parent.0.clone());
                }
            }
        }
    }

    Ok(retained)
}

#[cfg(test)]
#[path = "retention_tests.rs"]
mod tests;
