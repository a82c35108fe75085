// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event fold.
//!
//! [`Store::apply_envelope`] is the only mutation path into the cache.
//! Writers call it after a durable append; rebuild calls it for every
//! merged record. It trusts its input (validation happens before the
//! append) and is idempotent: re-applying a record reports `Unchanged`.

use super::wake::persist_mode_to_str;
use super::{Applied, Store};
use crate::error::StorageError;
use fray_core::{Envelope, Event, EventBody, WakeType};
use rusqlite::{params, OptionalExtension};

impl Store {
    pub fn apply_envelope(&self, envelope: &Envelope) -> Result<Applied, StorageError> {
        let event = match &envelope.body {
            EventBody::Event(event) => event,
            // Unknown records are preserved in the log, inert in the cache
            EventBody::Unknown(_) => return Ok(Applied::Unchanged),
        };

        // Each event applies atomically (e.g. a message insert and its
        // thread activity bump land together)
        let conn = self.conn();
        conn.execute_batch("SAVEPOINT apply_event")?;
        let result = self.apply_event(event, envelope.ts);
        match &result {
            Ok(_) => conn.execute_batch("RELEASE apply_event")?,
            Err(_) => {
                conn.execute_batch("ROLLBACK TO apply_event; RELEASE apply_event")?;
            }
        }
        result
    }

    fn apply_event(&self, event: &Event, ts: i64) -> Result<Applied, StorageError> {
        let conn = self.conn();
        match event {
            Event::MessageCreated { message } => {
                if self.is_tombstoned(message.id.as_str())? {
                    return Ok(Applied::Unchanged);
                }
                let existing: Option<(i64, String, String)> = conn
                    .query_row(
                        "SELECT ts, origin, body FROM messages WHERE id = ?1",
                        params![message.id.as_str()],
                        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                    )
                    .optional()?;
                if let Some((ets, eorigin, ebody)) = existing {
                    if ets == message.ts
                        && eorigin == message.origin.as_str()
                        && ebody == message.body
                    {
                        return Ok(Applied::Unchanged);
                    }
                    return Ok(Applied::Collision(message.id.to_string()));
                }

                conn.execute(
                    "INSERT INTO messages (id, ts, home, channel_id, from_agent, body, kind, \
                     reply_to, quote_message_guid, session_id, mentions, fork_sessions, refs, \
                     edited, edited_at, edit_count, archived_at, origin) \
                     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18)",
                    params![
                        message.id.as_str(),
                        message.ts,
                        message.home,
                        message.channel_id,
                        message.from_agent.as_str(),
                        message.body,
                        message.kind.to_string(),
                        message.reply_to.as_ref().map(|r| r.as_str()),
                        message.quote_message_guid.as_ref().map(|q| q.as_str()),
                        message.session_id.as_ref().map(|s| s.as_str()),
                        serde_json::to_string(&message.mentions)?,
                        serde_json::to_string(&message.fork_sessions)?,
                        serde_json::to_string(&message.references)?,
                        message.edited,
                        message.edited_at,
                        message.edit_count,
                        message.archived_at,
                        message.origin.as_str(),
                    ],
                )?;
                conn.execute(
                    "UPDATE threads SET last_activity_at = MAX(last_activity_at, ?1) WHERE guid = ?2",
                    params![message.ts, message.home],
                )?;
                // Posting is activity for the author
                conn.execute(
                    "UPDATE agents SET last_seen = MAX(last_seen, ?1) WHERE agent_id = ?2",
                    params![message.ts, message.from_agent.as_str()],
                )?;
                Ok(Applied::Changed)
            }

            Event::MessageUpdated {
                id,
                body,
                edited_at,
                ..
            } => {
                if self.is_tombstoned(id.as_str())? {
                    return Ok(Applied::Unchanged);
                }
                let changed = conn.execute(
                    "UPDATE messages SET body = ?1, edited = 1, edited_at = ?2, \
                     edit_count = edit_count + 1 WHERE id = ?3 AND kind != 'tombstone'",
                    params![body, edited_at, id.as_str()],
                )?;
                Ok(applied(changed))
            }

            Event::MessageMoved { id, to_home, .. } => {
                let changed = conn.execute(
                    "UPDATE messages SET home = ?1 WHERE id = ?2",
                    params![to_home, id.as_str()],
                )?;
                if changed > 0 {
                    conn.execute(
                        "UPDATE threads SET last_activity_at = MAX(last_activity_at, ?1) WHERE guid = ?2",
                        params![ts, to_home],
                    )?;
                }
                Ok(applied(changed))
            }

            Event::MessagePinned { id, thread, by } => {
                let changed = conn.execute(
                    "INSERT OR IGNORE INTO pins (thread, message, by_agent, at) VALUES (?1,?2,?3,?4)",
                    params![thread.as_str(), id.as_str(), by.as_str(), ts],
                )?;
                Ok(applied(changed))
            }

            Event::MessageUnpinned { id, thread, .. } => {
                let changed = conn.execute(
                    "DELETE FROM pins WHERE thread = ?1 AND message = ?2",
                    params![thread.as_str(), id.as_str()],
                )?;
                Ok(applied(changed))
            }

            Event::MessageDeleted { id, by } => {
                let inserted = conn.execute(
                    "INSERT OR IGNORE INTO tombstones (message, by_agent, ts) VALUES (?1,?2,?3)",
                    params![id.as_str(), by.as_str(), ts],
                )?;
                let removed = conn.execute(
                    "DELETE FROM messages WHERE id = ?1",
                    params![id.as_str()],
                )?;
                Ok(applied(inserted + removed))
            }

            Event::Reaction {
                message,
                emoji,
                agent,
                removed,
            } => {
                let changed = if *removed {
                    conn.execute(
                        "DELETE FROM reactions WHERE message = ?1 AND emoji = ?2 AND agent = ?3",
                        params![message.as_str(), emoji, agent.as_str()],
                    )?
                } else {
                    conn.execute(
                        "INSERT OR IGNORE INTO reactions (message, emoji, agent, reacted_at) \
                         VALUES (?1,?2,?3,?4)",
                        params![message.as_str(), emoji, agent.as_str(), ts],
                    )?
                };
                Ok(applied(changed))
            }

            Event::ThreadCreated { thread } => {
                let existing: Option<(i64, String)> = conn
                    .query_row(
                        "SELECT created_at, name FROM threads WHERE guid = ?1",
                        params![thread.guid.as_str()],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;
                if let Some((created_at, name)) = existing {
                    if created_at == thread.created_at && name == thread.name {
                        return Ok(Applied::Unchanged);
                    }
                    return Ok(Applied::Collision(thread.guid.to_string()));
                }
                conn.execute(
                    "INSERT INTO threads (guid, name, parent_thread, status, kind, created_at, \
                     created_by, owner_agent, anchor_message_guid, anchor_hidden, last_activity_at) \
                     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
                    params![
                        thread.guid.as_str(),
                        thread.name,
                        thread.parent_thread.as_ref().map(|p| p.as_str()),
                        status_str(thread.status),
                        kind_str(thread.kind),
                        thread.created_at,
                        thread.created_by.as_str(),
                        thread.owner_agent.as_ref().map(|o| o.as_str()),
                        thread.anchor_message_guid.as_ref().map(|a| a.as_str()),
                        thread.anchor_hidden,
                        thread.last_activity_at,
                    ],
                )?;
                Ok(Applied::Changed)
            }

            Event::ThreadUpdated { id, patch } => {
                let mut changed = 0;
                if let Some(name) = &patch.name {
                    changed += conn.execute(
                        "UPDATE threads SET name = ?1 WHERE guid = ?2",
                        params![name, id.as_str()],
                    )?;
                }
                if let Some(status) = patch.status {
                    changed += conn.execute(
                        "UPDATE threads SET status = ?1 WHERE guid = ?2",
                        params![status_str(status), id.as_str()],
                    )?;
                }
                if let Some(parent) = &patch.parent_thread {
                    changed += conn.execute(
                        "UPDATE threads SET parent_thread = ?1 WHERE guid = ?2",
                        params![parent.as_str(), id.as_str()],
                    )?;
                }
                if let Some(owner) = &patch.owner_agent {
                    changed += conn.execute(
                        "UPDATE threads SET owner_agent = ?1 WHERE guid = ?2",
                        params![owner.as_str(), id.as_str()],
                    )?;
                }
                if let Some(anchor) = &patch.anchor_message_guid {
                    changed += conn.execute(
                        "UPDATE threads SET anchor_message_guid = ?1 WHERE guid = ?2",
                        params![anchor.as_str(), id.as_str()],
                    )?;
                }
                if patch.clear_anchor {
                    changed += conn.execute(
                        "UPDATE threads SET anchor_message_guid = NULL WHERE guid = ?1",
                        params![id.as_str()],
                    )?;
                }
                if let Some(hidden) = patch.anchor_hidden {
                    changed += conn.execute(
                        "UPDATE threads SET anchor_hidden = ?1 WHERE guid = ?2",
                        params![hidden, id.as_str()],
                    )?;
                }
                Ok(applied(changed))
            }

            Event::Subscribed { agent, thread } => {
                let changed = conn.execute(
                    "INSERT OR IGNORE INTO subscriptions (agent, thread, at) VALUES (?1,?2,?3)",
                    params![agent.as_str(), thread.as_str(), ts],
                )?;
                Ok(applied(changed))
            }

            Event::Unsubscribed { agent, thread } => {
                let changed = conn.execute(
                    "DELETE FROM subscriptions WHERE agent = ?1 AND thread = ?2",
                    params![agent.as_str(), thread.as_str()],
                )?;
                Ok(applied(changed))
            }

            Event::QuestionCreated { question } => {
                let changed = conn.execute(
                    "INSERT OR IGNORE INTO questions (guid, asked_by, asked_of, body, home, \
                     status, answer, created_at, answered_at) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
                    params![
                        question.guid.as_str(),
                        question.asked_by.as_str(),
                        question.asked_of.as_ref().map(|a| a.as_str()),
                        question.body,
                        question.home,
                        question_status_str(question.status),
                        question.answer,
                        question.created_at,
                        question.answered_at,
                    ],
                )?;
                Ok(applied(changed))
            }

            Event::QuestionUpdated { id, status, answer } => {
                let mut changed = 0;
                if let Some(status) = status {
                    changed += conn.execute(
                        "UPDATE questions SET status = ?1, answered_at = ?2 WHERE guid = ?3",
                        params![question_status_str(*status), ts, id.as_str()],
                    )?;
                }
                if let Some(answer) = answer {
                    changed += conn.execute(
                        "UPDATE questions SET answer = ?1 WHERE guid = ?2",
                        params![answer, id.as_str()],
                    )?;
                }
                Ok(applied(changed))
            }

            Event::AgentRegistered { agent } => {
                conn.execute(
                    "INSERT INTO agents (agent_id, guid, managed, invoke, presence, status, \
                     avatar, registered_at, last_seen, left_at, mention_watermark, \
                     reaction_watermark, last_heartbeat, last_session_id, session_mode, job_id, \
                     job_idx, is_ephemeral, last_known_input, last_known_output, tokens_updated_at) \
                     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21) \
                     ON CONFLICT(agent_id) DO UPDATE SET \
                     managed = excluded.managed, invoke = excluded.invoke, \
                     status = excluded.status, avatar = excluded.avatar, \
                     last_seen = excluded.last_seen, job_id = excluded.job_id, \
                     job_idx = excluded.job_idx, is_ephemeral = excluded.is_ephemeral",
                    params![
                        agent.agent_id.as_str(),
                        agent.guid,
                        agent.managed,
                        agent
                            .invoke
                            .as_ref()
                            .map(serde_json::to_string)
                            .transpose()?,
                        agent.presence.as_str(),
                        agent.status,
                        agent.avatar,
                        agent.registered_at,
                        agent.last_seen,
                        agent.left_at,
                        agent.mention_watermark,
                        agent.reaction_watermark,
                        agent.last_heartbeat as i64,
                        agent.last_session_id.as_ref().map(|s| s.as_str()),
                        agent.session_mode,
                        agent.job_id.as_ref().map(|j| j.as_str()),
                        agent.job_idx,
                        agent.is_ephemeral,
                        agent.last_known_input as i64,
                        agent.last_known_output as i64,
                        agent.tokens_updated_at,
                    ],
                )?;
                Ok(Applied::Changed)
            }

            Event::AgentUpdated { id, patch } => {
                let mut changed = 0;
                if let Some(status) = &patch.status {
                    changed += conn.execute(
                        "UPDATE agents SET status = ?1 WHERE agent_id = ?2",
                        params![status, id.as_str()],
                    )?;
                }
                if let Some(avatar) = &patch.avatar {
                    changed += conn.execute(
                        "UPDATE agents SET avatar = ?1 WHERE agent_id = ?2",
                        params![avatar, id.as_str()],
                    )?;
                }
                if let Some(last_seen) = patch.last_seen {
                    changed += conn.execute(
                        "UPDATE agents SET last_seen = ?1 WHERE agent_id = ?2",
                        params![last_seen, id.as_str()],
                    )?;
                }
                if let Some(left_at) = patch.left_at {
                    changed += conn.execute(
                        "UPDATE agents SET left_at = ?1 WHERE agent_id = ?2",
                        params![left_at, id.as_str()],
                    )?;
                }
                if patch.returned {
                    changed += conn.execute(
                        "UPDATE agents SET left_at = NULL WHERE agent_id = ?1",
                        params![id.as_str()],
                    )?;
                }
                if let Some(watermark) = &patch.mention_watermark {
                    changed += conn.execute(
                        "UPDATE agents SET mention_watermark = ?1 WHERE agent_id = ?2",
                        params![watermark, id.as_str()],
                    )?;
                }
                if let Some(watermark) = patch.reaction_watermark {
                    changed += conn.execute(
                        "UPDATE agents SET reaction_watermark = ?1 WHERE agent_id = ?2",
                        params![watermark, id.as_str()],
                    )?;
                }
                if let Some(session) = &patch.last_session_id {
                    changed += conn.execute(
                        "UPDATE agents SET last_session_id = ?1 WHERE agent_id = ?2",
                        params![session.as_str(), id.as_str()],
                    )?;
                }
                if patch.clear_session {
                    changed += conn.execute(
                        "UPDATE agents SET last_session_id = NULL WHERE agent_id = ?1",
                        params![id.as_str()],
                    )?;
                }
                if let Some(mode) = &patch.session_mode {
                    changed += conn.execute(
                        "UPDATE agents SET session_mode = ?1 WHERE agent_id = ?2",
                        params![mode, id.as_str()],
                    )?;
                }
                if let Some(input) = patch.last_known_input {
                    changed += conn.execute(
                        "UPDATE agents SET last_known_input = ?1 WHERE agent_id = ?2",
                        params![input as i64, id.as_str()],
                    )?;
                }
                if let Some(output) = patch.last_known_output {
                    changed += conn.execute(
                        "UPDATE agents SET last_known_output = ?1 WHERE agent_id = ?2",
                        params![output as i64, id.as_str()],
                    )?;
                }
                if let Some(at) = patch.tokens_updated_at {
                    changed += conn.execute(
                        "UPDATE agents SET tokens_updated_at = ?1 WHERE agent_id = ?2",
                        params![at, id.as_str()],
                    )?;
                }
                Ok(applied(changed))
            }

            Event::AgentDescriptor {
                agent_id,
                managed,
                invoke,
                avatar,
            } => {
                let invoke_json = invoke.as_ref().map(serde_json::to_string).transpose()?;
                let changed = conn.execute(
                    "INSERT INTO agents (agent_id, guid, managed, invoke, avatar, registered_at, last_seen) \
                     VALUES (?1, ?1, ?2, ?3, ?4, ?5, ?5) \
                     ON CONFLICT(agent_id) DO UPDATE SET \
                     managed = excluded.managed, invoke = excluded.invoke, avatar = excluded.avatar",
                    params![agent_id.as_str(), managed, invoke_json, avatar, ts],
                )?;
                Ok(applied(changed))
            }

            Event::SessionStart {
                agent_id,
                session_id,
                ..
            } => {
                let changed = conn.execute(
                    "UPDATE agents SET last_session_id = ?1, last_seen = ?2 WHERE agent_id = ?3",
                    params![session_id.as_str(), ts, agent_id.as_str()],
                )?;
                Ok(applied(changed))
            }

            Event::SessionEnd { agent_id, .. } => {
                let changed = conn.execute(
                    "UPDATE agents SET last_seen = ?1 WHERE agent_id = ?2",
                    params![ts, agent_id.as_str()],
                )?;
                Ok(applied(changed))
            }

            Event::JobCreated { job } => {
                let existing: Option<i64> = conn
                    .query_row(
                        "SELECT created_at FROM jobs WHERE guid = ?1",
                        params![job.guid.as_str()],
                        |row| row.get(0),
                    )
                    .optional()?;
                if let Some(created_at) = existing {
                    if created_at == job.created_at {
                        return Ok(Applied::Unchanged);
                    }
                    return Ok(Applied::Collision(job.guid.to_string()));
                }
                conn.execute(
                    "INSERT INTO jobs (guid, name, context, owner_agent, status, thread_guid, \
                     created_at, completed_at) VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
                    params![
                        job.guid.as_str(),
                        job.name,
                        job.context
                            .as_ref()
                            .map(serde_json::to_string)
                            .transpose()?,
                        job.owner_agent.as_str(),
                        job.status.to_string(),
                        job.thread_guid.as_ref().map(|t| t.as_str()),
                        job.created_at,
                        job.completed_at,
                    ],
                )?;
                Ok(Applied::Changed)
            }

            Event::JobUpdated {
                id,
                status,
                completed_at,
            } => {
                let mut changed = 0;
                if let Some(status) = status {
                    changed += conn.execute(
                        "UPDATE jobs SET status = ?1 WHERE guid = ?2",
                        params![status.to_string(), id.as_str()],
                    )?;
                }
                if let Some(completed_at) = completed_at {
                    changed += conn.execute(
                        "UPDATE jobs SET completed_at = ?1 WHERE guid = ?2",
                        params![completed_at, id.as_str()],
                    )?;
                }
                Ok(applied(changed))
            }

            Event::JobWorkerJoined { job, agent_id, idx } => {
                conn.execute(
                    "INSERT INTO agents (agent_id, guid, managed, registered_at, last_seen, \
                     job_id, job_idx, is_ephemeral) VALUES (?1, ?1, 1, ?2, ?2, ?3, ?4, 1) \
                     ON CONFLICT(agent_id) DO UPDATE SET \
                     job_id = excluded.job_id, job_idx = excluded.job_idx, \
                     is_ephemeral = 1, left_at = NULL",
                    params![agent_id.as_str(), ts, job.as_str(), idx],
                )?;
                Ok(Applied::Changed)
            }

            Event::JobWorkerLeft { agent_id, .. } => {
                let changed = conn.execute(
                    "UPDATE agents SET left_at = ?1 WHERE agent_id = ?2",
                    params![ts, agent_id.as_str()],
                )?;
                Ok(applied(changed))
            }

            Event::WakeConditionSet { condition } => {
                let on_agents: Vec<&str> =
                    condition.on_agents.iter().map(|a| a.as_str()).collect();
                conn.execute(
                    "INSERT INTO wake_conditions (guid, agent_id, set_by, wake_type, pattern, \
                     on_agents, in_thread, after_ms, use_router, prompt_text, poll_interval_ms, \
                     last_polled_at, persist_mode, paused, created_at, expires_at) \
                     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16) \
                     ON CONFLICT(guid) DO UPDATE SET \
                     pattern = excluded.pattern, on_agents = excluded.on_agents, \
                     in_thread = excluded.in_thread, after_ms = excluded.after_ms, \
                     use_router = excluded.use_router, prompt_text = excluded.prompt_text, \
                     poll_interval_ms = excluded.poll_interval_ms, \
                     persist_mode = excluded.persist_mode, paused = excluded.paused, \
                     expires_at = excluded.expires_at",
                    params![
                        condition.guid.as_str(),
                        condition.agent_id.as_str(),
                        condition.set_by.as_str(),
                        condition.wake_type.to_string(),
                        condition.pattern,
                        serde_json::to_string(&on_agents)?,
                        condition.in_thread.as_ref().map(|t| t.as_str()),
                        condition.after_ms as i64,
                        condition.use_router,
                        condition.prompt_text,
                        condition.poll_interval_ms as i64,
                        condition.last_polled_at,
                        persist_mode_to_str(condition.persist_mode),
                        condition.paused,
                        condition.created_at,
                        condition.expires_at,
                    ],
                )?;
                Ok(Applied::Changed)
            }

            Event::WakeConditionCleared { id } | Event::WakeConditionDeleted { id } => {
                let changed = conn.execute(
                    "DELETE FROM wake_conditions WHERE guid = ?1",
                    params![id.as_str()],
                )?;
                Ok(applied(changed))
            }

            Event::WakeConditionPaused { id } => {
                let changed = conn.execute(
                    "UPDATE wake_conditions SET paused = 1 WHERE guid = ?1",
                    params![id.as_str()],
                )?;
                Ok(applied(changed))
            }

            Event::WakeConditionResumed { id } => {
                let changed = conn.execute(
                    "UPDATE wake_conditions SET paused = 0 WHERE guid = ?1",
                    params![id.as_str()],
                )?;
                Ok(applied(changed))
            }

            Event::WakeConditionReset { id } => {
                // Re-arm: timers restart from the reset instant, polls
                // consider themselves freshly polled.
                let changed = conn.execute(
                    "UPDATE wake_conditions SET last_polled_at = ?1, \
                     expires_at = CASE WHEN wake_type = ?2 THEN ?1 + (after_ms / 1000) ELSE expires_at END \
                     WHERE guid = ?3",
                    params![ts, WakeType::After.to_string(), id.as_str()],
                )?;
                Ok(applied(changed))
            }

            Event::Fave { message, agent } => {
                let changed = conn.execute(
                    "INSERT OR IGNORE INTO faves (agent, message, at) VALUES (?1,?2,?3)",
                    params![agent.as_str(), message.as_str(), ts],
                )?;
                Ok(applied(changed))
            }

            Event::Unfave { message, agent } => {
                let changed = conn.execute(
                    "DELETE FROM faves WHERE agent = ?1 AND message = ?2",
                    params![agent.as_str(), message.as_str()],
                )?;
                Ok(applied(changed))
            }

            Event::ReadTo {
                agent,
                home,
                message,
            } => {
                conn.execute(
                    "INSERT INTO read_marks (agent, home, message, at) VALUES (?1,?2,?3,?4) \
                     ON CONFLICT(agent, home) DO UPDATE SET \
                     message = excluded.message, at = excluded.at",
                    params![agent.as_str(), home, message.as_str(), ts],
                )?;
                Ok(Applied::Changed)
            }

            Event::Heartbeat { agent_id, at_ms } => {
                let changed = conn.execute(
                    "UPDATE agents SET last_heartbeat = ?1, \
                     presence = CASE WHEN presence = 'error' THEN 'active' ELSE presence END \
                     WHERE agent_id = ?2",
                    params![*at_ms as i64, agent_id.as_str()],
                )?;
                Ok(applied(changed))
            }

            Event::PresenceChanged { agent_id, presence } => {
                let changed = conn.execute(
                    "UPDATE agents SET presence = ?1 WHERE agent_id = ?2",
                    params![presence.as_str(), agent_id.as_str()],
                )?;
                Ok(applied(changed))
            }
        }
    }
}

fn applied(changed: usize) -> Applied {
    if changed > 0 {
        Applied::Changed
    } else {
        Applied::Unchanged
    }
}

fn status_str(status: fray_core::ThreadStatus) -> &'static str {
    match status {
        fray_core::ThreadStatus::Open => "open",
        fray_core::ThreadStatus::Archived => "archived",
    }
}

fn kind_str(kind: fray_core::ThreadKind) -> &'static str {
    match kind {
        fray_core::ThreadKind::Standard => "standard",
        fray_core::ThreadKind::Knowledge => "knowledge",
        fray_core::ThreadKind::System => "system",
    }
}

fn question_status_str(status: fray_core::QuestionStatus) -> &'static str {
    match status {
        fray_core::QuestionStatus::Open => "open",
        fray_core::QuestionStatus::Answered => "answered",
        fray_core::QuestionStatus::Dismissed => "dismissed",
    }
}
