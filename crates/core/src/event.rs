// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event types for the Fray log.
//!
//! Every shared or runtime JSONL line is an [`crate::Envelope`] whose body
//! is one of these events. Serializes with `{"type": "message", ...fields}`
//! format. Unknown type tags are preserved at the envelope layer, not here.

use crate::agent::{AgentRecord, InvokeConfig, Presence};
use crate::job::{Job, JobStatus};
use crate::message::Message;
use crate::question::{Question, QuestionStatus};
use crate::thread::{Thread, ThreadStatus};
use crate::wake::WakeCondition;
use crate::{AgentId, JobId, MessageId, QuestionId, SessionId, ThreadId, WakeId};
use serde::{Deserialize, Serialize};

/// Partial update to an agent row.
///
/// Absent fields leave the row untouched. `returned` clears `left_at`
/// (the `back` command); `left_at` alone records a `bye`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AgentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_at: Option<i64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub returned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mention_watermark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_watermark: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_session_id: Option<SessionId>,
    /// Forget the prior driver session (failed resume recovery).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub clear_session: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_known_input: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_known_output: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_updated_at: Option<i64>,
}

/// Partial update to a thread row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ThreadPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ThreadStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_thread: Option<ThreadId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_agent: Option<AgentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_message_guid: Option<MessageId>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub clear_anchor: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_hidden: Option<bool>,
}

/// Events that mutate project state.
///
/// Shared events live in `shared/machines/<id>/*.jsonl`; `heartbeat`,
/// `presence`, `session_start`/`session_end` and registrations also flow
/// through `local/runtime.jsonl` and are overlaid during rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    // -- messages --
    #[serde(rename = "message")]
    MessageCreated { message: Message },

    #[serde(rename = "message_update")]
    MessageUpdated {
        id: MessageId,
        body: String,
        edited_at: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        editor: Option<AgentId>,
    },

    #[serde(rename = "message_move")]
    MessageMoved {
        id: MessageId,
        to_home: String,
        by: AgentId,
    },

    #[serde(rename = "message_pin")]
    MessagePinned {
        id: MessageId,
        thread: ThreadId,
        by: AgentId,
    },

    #[serde(rename = "message_unpin")]
    MessageUnpinned {
        id: MessageId,
        thread: ThreadId,
        by: AgentId,
    },

    /// Sticky tombstone: once durable, the target is never re-materialized.
    #[serde(rename = "message_delete")]
    MessageDeleted { id: MessageId, by: AgentId },

    #[serde(rename = "reaction")]
    Reaction {
        message: MessageId,
        emoji: String,
        agent: AgentId,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        removed: bool,
    },

    // -- threads --
    #[serde(rename = "thread")]
    ThreadCreated { thread: Thread },

    #[serde(rename = "thread_update")]
    ThreadUpdated {
        id: ThreadId,
        #[serde(flatten)]
        patch: ThreadPatch,
    },

    #[serde(rename = "thread_subscribe")]
    Subscribed { agent: AgentId, thread: ThreadId },

    #[serde(rename = "thread_unsubscribe")]
    Unsubscribed { agent: AgentId, thread: ThreadId },

    // -- questions --
    #[serde(rename = "question")]
    QuestionCreated { question: Question },

    #[serde(rename = "question_update")]
    QuestionUpdated {
        id: QuestionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<QuestionStatus>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        answer: Option<String>,
    },

    // -- agents --
    #[serde(rename = "agent")]
    AgentRegistered { agent: AgentRecord },

    #[serde(rename = "agent_update")]
    AgentUpdated {
        id: AgentId,
        #[serde(flatten)]
        patch: AgentPatch,
    },

    /// Shareable spawn descriptor, used to seed agents on join-existing.
    #[serde(rename = "agent_descriptor")]
    AgentDescriptor {
        agent_id: AgentId,
        #[serde(default)]
        managed: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        invoke: Option<InvokeConfig>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        avatar: Option<String>,
    },

    // -- sessions --
    #[serde(rename = "session_start")]
    SessionStart {
        agent_id: AgentId,
        session_id: SessionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        home: Option<String>,
    },

    #[serde(rename = "session_end")]
    SessionEnd {
        agent_id: AgentId,
        session_id: SessionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exit_code: Option<i32>,
    },

    // -- jobs --
    #[serde(rename = "job_create")]
    JobCreated { job: Job },

    #[serde(rename = "job_update")]
    JobUpdated {
        id: JobId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<JobStatus>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        completed_at: Option<i64>,
    },

    #[serde(rename = "job_worker_join")]
    JobWorkerJoined {
        job: JobId,
        agent_id: AgentId,
        idx: u32,
    },

    #[serde(rename = "job_worker_leave")]
    JobWorkerLeft { job: JobId, agent_id: AgentId },

    // -- wake conditions --
    #[serde(rename = "wake_condition")]
    WakeConditionSet { condition: WakeCondition },

    /// Cleared after triggering (per persist mode) or by `bye`.
    #[serde(rename = "wake_condition_clear")]
    WakeConditionCleared { id: WakeId },

    #[serde(rename = "wake_condition_pause")]
    WakeConditionPaused { id: WakeId },

    #[serde(rename = "wake_condition_resume")]
    WakeConditionResumed { id: WakeId },

    /// Re-arm a persistent condition's timer/poll bookkeeping.
    #[serde(rename = "wake_condition_reset")]
    WakeConditionReset { id: WakeId },

    /// Explicit removal by a user.
    #[serde(rename = "wake_condition_delete")]
    WakeConditionDeleted { id: WakeId },

    // -- marks --
    #[serde(rename = "fave")]
    Fave { message: MessageId, agent: AgentId },

    #[serde(rename = "unfave")]
    Unfave { message: MessageId, agent: AgentId },

    #[serde(rename = "read_to")]
    ReadTo {
        agent: AgentId,
        home: String,
        message: MessageId,
    },

    // -- runtime-local --
    #[serde(rename = "heartbeat")]
    Heartbeat { agent_id: AgentId, at_ms: u64 },

    #[serde(rename = "presence")]
    PresenceChanged {
        agent_id: AgentId,
        presence: Presence,
    },
}

impl Event {
    /// Wire discriminator for this event.
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::MessageCreated { .. } => "message",
            Event::MessageUpdated { .. } => "message_update",
            Event::MessageMoved { .. } => "message_move",
            Event::MessagePinned { .. } => "message_pin",
            Event::MessageUnpinned { .. } => "message_unpin",
            Event::MessageDeleted { .. } => "message_delete",
            Event::Reaction { .. } => "reaction",
            Event::ThreadCreated { .. } => "thread",
            Event::ThreadUpdated { .. } => "thread_update",
            Event::Subscribed { .. } => "thread_subscribe",
            Event::Unsubscribed { .. } => "thread_unsubscribe",
            Event::QuestionCreated { .. } => "question",
            Event::QuestionUpdated { .. } => "question_update",
            Event::AgentRegistered { .. } => "agent",
            Event::AgentUpdated { .. } => "agent_update",
            Event::AgentDescriptor { .. } => "agent_descriptor",
            Event::SessionStart { .. } => "session_start",
            Event::SessionEnd { .. } => "session_end",
            Event::JobCreated { .. } => "job_create",
            Event::JobUpdated { .. } => "job_update",
            Event::JobWorkerJoined { .. } => "job_worker_join",
            Event::JobWorkerLeft { .. } => "job_worker_leave",
            Event::WakeConditionSet { .. } => "wake_condition",
            Event::WakeConditionCleared { .. } => "wake_condition_clear",
            Event::WakeConditionPaused { .. } => "wake_condition_pause",
            Event::WakeConditionResumed { .. } => "wake_condition_resume",
            Event::WakeConditionReset { .. } => "wake_condition_reset",
            Event::WakeConditionDeleted { .. } => "wake_condition_delete",
            Event::Fave { .. } => "fave",
            Event::Unfave { .. } => "unfave",
            Event::ReadTo { .. } => "read_to",
            Event::Heartbeat { .. } => "heartbeat",
            Event::PresenceChanged { .. } => "presence",
        }
    }

    /// One-line summary for daemon logs.
    pub fn compact(&self) -> String {
        let t = self.type_name();
        match self {
            Event::MessageCreated { message } => format!(
                "{t} id={} from={} home={}",
                message.id, message.from_agent, message.home
            ),
            Event::MessageUpdated { id, .. } => format!("{t} id={id}"),
            Event::MessageMoved { id, to_home, .. } => format!("{t} id={id} to={to_home}"),
            Event::MessagePinned { id, thread, .. }
            | Event::MessageUnpinned { id, thread, .. } => {
                format!("{t} id={id} thread={thread}")
            }
            Event::MessageDeleted { id, by } => format!("{t} id={id} by={by}"),
            Event::Reaction {
                message,
                emoji,
                agent,
                removed,
            } => {
                if *removed {
                    format!("{t} msg={message} emoji={emoji} agent={agent} removed")
                } else {
                    format!("{t} msg={message} emoji={emoji} agent={agent}")
                }
            }
            Event::ThreadCreated { thread } => {
                format!("{t} guid={} name={}", thread.guid, thread.name)
            }
            Event::ThreadUpdated { id, .. } => format!("{t} id={id}"),
            Event::Subscribed { agent, thread } | Event::Unsubscribed { agent, thread } => {
                format!("{t} agent={agent} thread={thread}")
            }
            Event::QuestionCreated { question } => {
                format!("{t} guid={} by={}", question.guid, question.asked_by)
            }
            Event::QuestionUpdated { id, .. } => format!("{t} id={id}"),
            Event::AgentRegistered { agent } => {
                format!("{t} id={} managed={}", agent.agent_id, agent.managed)
            }
            Event::AgentUpdated { id, .. } => format!("{t} id={id}"),
            Event::AgentDescriptor {
                agent_id, managed, ..
            } => format!("{t} id={agent_id} managed={managed}"),
            Event::SessionStart {
                agent_id,
                session_id,
                ..
            } => format!("{t} agent={agent_id} session={}", session_id.short(8)),
            Event::SessionEnd {
                agent_id,
                session_id,
                exit_code,
            } => match exit_code {
                Some(code) => format!(
                    "{t} agent={agent_id} session={} exit={code}",
                    session_id.short(8)
                ),
                None => format!("{t} agent={agent_id} session={}", session_id.short(8)),
            },
            Event::JobCreated { job } => format!("{t} guid={} name={}", job.guid, job.name),
            Event::JobUpdated { id, status, .. } => match status {
                Some(s) => format!("{t} id={id} status={s}"),
                None => format!("{t} id={id}"),
            },
            Event::JobWorkerJoined { job, agent_id, idx } => {
                format!("{t} job={job} agent={agent_id} idx={idx}")
            }
            Event::JobWorkerLeft { job, agent_id } => format!("{t} job={job} agent={agent_id}"),
            Event::WakeConditionSet { condition } => format!(
                "{t} guid={} agent={} type={}",
                condition.guid, condition.agent_id, condition.wake_type
            ),
            Event::WakeConditionCleared { id }
            | Event::WakeConditionPaused { id }
            | Event::WakeConditionResumed { id }
            | Event::WakeConditionReset { id }
            | Event::WakeConditionDeleted { id } => format!("{t} id={id}"),
            Event::Fave { message, agent } | Event::Unfave { message, agent } => {
                format!("{t} msg={message} agent={agent}")
            }
            Event::ReadTo {
                agent,
                home,
                message,
            } => format!("{t} agent={agent} home={home} msg={message}"),
            Event::Heartbeat { agent_id, at_ms } => format!("{t} agent={agent_id} at={at_ms}"),
            Event::PresenceChanged { agent_id, presence } => {
                format!("{t} agent={agent_id} presence={presence}")
            }
        }
    }

    /// The message this event targets, when it targets one.
    pub fn message_id(&self) -> Option<&MessageId> {
        match self {
            Event::MessageCreated { message } => Some(&message.id),
            Event::MessageUpdated { id, .. }
            | Event::MessageMoved { id, .. }
            | Event::MessagePinned { id, .. }
            | Event::MessageUnpinned { id, .. }
            | Event::MessageDeleted { id, .. } => Some(id),
            Event::Reaction { message, .. }
            | Event::Fave { message, .. }
            | Event::Unfave { message, .. }
            | Event::ReadTo { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
