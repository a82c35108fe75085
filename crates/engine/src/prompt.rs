// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wake-prompt rendering.
//!
//! The daemon builds the prompt handed to a driver process from a
//! template: the built-in default, or `.fray/llm/prompts/wake.md` when
//! the project overrides it. Interpolation is `${var}` with unknown
//! variables left as-is.

use fray_core::Message;
use std::collections::HashMap;

pub const DEFAULT_WAKE_TEMPLATE: &str = "\
You are ${agent_id} in the \"${channel}\" project.

You were woken because: ${wake_reason}

New messages in ${home}:
${messages}
${fork_notes}
Reply with `fray post` and mark yourself done with `fray bye` when finished.
";

/// Substitute `${key}` occurrences. Unknown keys pass through untouched
/// so templates stay debuggable.
pub fn interpolate(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("${");
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str("${");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Everything the wake prompt interpolates.
pub struct WakePromptInput<'a> {
    pub agent_id: &'a str,
    pub channel: &'a str,
    /// `"room"` or the thread name.
    pub home: &'a str,
    pub wake_reason: &'a str,
    /// Triggering messages, oldest first.
    pub messages: &'a [Message],
    /// recipient → prior session id from fork syntax; rendered as a
    /// visibility pointer, never a resume.
    pub fork_session: Option<&'a str>,
    /// The referenced session no longer exists in the driver's history.
    pub fork_session_pruned: bool,
}

pub fn render_wake_prompt(template: &str, input: &WakePromptInput<'_>) -> String {
    let rendered_messages = if input.messages.is_empty() {
        "(none)".to_string()
    } else {
        input
            .messages
            .iter()
            .map(|m| format!("[{}] @{}: {}", m.id.short(12), m.from_agent, m.body))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let fork_notes = match (input.fork_session, input.fork_session_pruned) {
        (Some(session), false) => format!(
            "\nPrior context: session {session} is visible to you via `fray session show {session}`.\n"
        ),
        (Some(session), true) => format!(
            "\nPrior context: session {session} was referenced but is no longer available; start fresh.\n"
        ),
        (None, _) => String::new(),
    };

    let mut vars = HashMap::new();
    vars.insert("agent_id".to_string(), input.agent_id.to_string());
    vars.insert("channel".to_string(), input.channel.to_string());
    vars.insert("home".to_string(), input.home.to_string());
    vars.insert("wake_reason".to_string(), input.wake_reason.to_string());
    vars.insert("messages".to_string(), rendered_messages);
    vars.insert("fork_notes".to_string(), fork_notes);

    interpolate(template, &vars)
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
