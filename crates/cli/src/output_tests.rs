// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fray_core::{AgentId, MessageId, ReactionMark};

#[test]
fn message_line_basic() {
    let message = Message::new(
        MessageId::new("msg-abcdef123456"),
        1_700_000_000,
        "room",
        AgentId::new("alice"),
        "hello",
    );
    assert_eq!(message_line(&message), "[msg-abcdef12] @alice: hello");
}

#[test]
fn message_line_marks_edits_and_reactions() {
    let mut message = Message::new(
        MessageId::new("msg-abcdef123456"),
        1_700_000_000,
        "room",
        AgentId::new("alice"),
        "hello",
    );
    message.edited = true;
    message.reactions.insert(
        "👍".to_string(),
        vec![ReactionMark {
            agent: AgentId::new("bob"),
            reacted_at: 1,
        }],
    );
    let line = message_line(&message);
    assert!(line.contains("(edited)"));
    assert!(line.contains("👍"));
}

#[test]
fn agent_line_shows_presence_and_away() {
    let mut agent =
        fray_core::AgentRecord::new("usr-x", AgentId::new("alice"), 1_700_000_000);
    agent.managed = true;
    agent.left_at = Some(1_700_000_100);
    agent.status = Some("reviewing PRs".to_string());
    let line = agent_line(&agent);
    assert!(line.contains("managed"));
    assert!(line.contains("offline"));
    assert!(line.contains("(away)"));
    assert!(line.contains("reviewing PRs"));
}
