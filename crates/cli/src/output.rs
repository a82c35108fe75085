// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plain-text output helpers.

use fray_core::{AgentRecord, Message, Thread};

pub fn message_line(message: &Message) -> String {
    let mut line = format!(
        "[{}] @{}: {}",
        message.id.short(12),
        message.from_agent,
        message.body
    );
    if message.edited {
        line.push_str(" (edited)");
    }
    if !message.reactions.is_empty() {
        let mut emojis: Vec<&str> = message.reactions.keys().map(String::as_str).collect();
        emojis.sort_unstable();
        line.push_str(&format!(" [{}]", emojis.join(" ")));
    }
    line
}

pub fn thread_line(thread: &Thread) -> String {
    format!(
        "{}  {}  ({}, {})",
        thread.guid.short(12),
        thread.name,
        thread.status_label(),
        thread.kind_label()
    )
}

pub fn agent_line(agent: &AgentRecord) -> String {
    let mut line = format!(
        "{}  {}  {}",
        agent.agent_id,
        if agent.managed { "managed" } else { "human" },
        agent.presence
    );
    if agent.is_away() {
        line.push_str("  (away)");
    }
    if let Some(status) = &agent.status {
        line.push_str(&format!("  \"{status}\""));
    }
    line
}

trait Labels {
    fn status_label(&self) -> &'static str;
    fn kind_label(&self) -> &'static str;
}

impl Labels for Thread {
    fn status_label(&self) -> &'static str {
        match self.status {
            fray_core::ThreadStatus::Open => "open",
            fray_core::ThreadStatus::Archived => "archived",
        }
    }

    fn kind_label(&self) -> &'static str {
        match self.kind {
            fray_core::ThreadKind::Standard => "standard",
            fray_core::ThreadKind::Knowledge => "knowledge",
            fray_core::ThreadKind::System => "system",
        }
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
