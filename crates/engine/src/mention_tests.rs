// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fray_core::AgentId;
use yare::parameterized;

fn agent(id: &str) -> AgentRecord {
    let mut record = AgentRecord::new(format!("usr-{id}"), AgentId::new(id), 1_700_000_000);
    record.managed = true;
    record
}

fn worker(id: &str) -> AgentRecord {
    let mut record = agent(id);
    record.is_ephemeral = true;
    record
}

fn ctx<'a>(from: &'a str, agents: &'a [AgentRecord]) -> ClassifyContext<'a> {
    ClassifyContext {
        from_agent: from,
        reply_chain_authors: &[],
        agents,
        machine: "m1",
    }
}

#[test]
fn extract_offsets_and_addresses() {
    let hits = extract_mentions("hi @alice and @bob.1, also x@nota mention");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].offset, 3);
    assert_eq!(hits[0].address.agent, "alice");
    assert_eq!(hits[1].offset, 14);
    assert_eq!(hits[1].address.dotted_name(), "bob.1");
}

#[test]
fn leading_mention_is_direct() {
    let agents = [agent("alice")];
    let out = classify("@alice can you help?", &ctx("bob", &agents));
    assert_eq!(out.recipients["alice"], MentionClass::DirectAddress);
}

#[test]
fn several_leading_mentions_all_direct() {
    let agents = [agent("alice"), agent("carol")];
    let out = classify("@alice, @carol: please sync", &ctx("bob", &agents));
    assert_eq!(out.recipients["alice"], MentionClass::DirectAddress);
    assert_eq!(out.recipients["carol"], MentionClass::DirectAddress);
}

#[parameterized(
    fyi = { "FYI @alice deploy is done" },
    cc = { "cc @alice" },
    heads_up = { "heads up @alice the build is red" },
    mid_sentence = { "I talked to @alice about it" },
)]
fn cc_mentions_do_not_wake(body: &str) {
    let agents = [agent("alice")];
    let out = classify(body, &ctx("bob", &agents));
    assert_eq!(out.recipients["alice"], MentionClass::CcFyi);
    assert!(out.recipients["alice"].is_inert());
}

#[test]
fn self_mention_is_inert() {
    let agents = [agent("alice")];
    let out = classify("@alice note to self", &ctx("alice", &agents));
    assert_eq!(out.recipients["alice"], MentionClass::SelfMention);
}

#[test]
fn broadcast_detected_when_leading() {
    let agents = [agent("alice")];
    let out = classify("@all standup time", &ctx("bob", &agents));
    assert!(out.broadcast);
    assert_eq!(out.recipients["all"], MentionClass::Broadcast);

    let out = classify("telling @all eventually", &ctx("bob", &agents));
    assert!(!out.broadcast);
    assert_eq!(out.recipients["all"], MentionClass::CcFyi);
}

#[test]
fn reply_chain_propagates() {
    let agents = [agent("alice")];
    let mut context = ctx("bob", &agents);
    let authors = vec!["alice".to_string()];
    context.reply_chain_authors = &authors;

    let out = classify("looks good", &context);
    assert_eq!(out.recipients["alice"], MentionClass::ReplyChain);
}

#[test]
fn reply_chain_does_not_downgrade_direct() {
    let agents = [agent("alice")];
    let mut context = ctx("bob", &agents);
    let authors = vec!["alice".to_string()];
    context.reply_chain_authors = &authors;

    let out = classify("@alice see above", &context);
    assert_eq!(out.recipients["alice"], MentionClass::DirectAddress);
}

#[test]
fn reply_to_self_stays_inert() {
    let agents = [agent("bob")];
    let mut context = ctx("bob", &agents);
    let authors = vec!["bob".to_string()];
    context.reply_chain_authors = &authors;

    let out = classify("adding detail", &context);
    assert_eq!(out.recipients["bob"], MentionClass::SelfMention);
}

#[test]
fn subagent_mention_matches_descendants() {
    let agents = [agent("alice"), agent("alice.1"), agent("alice.2")];
    let out = classify("@alice fan out please", &ctx("bob", &agents));
    assert_eq!(out.recipients["alice"], MentionClass::DirectAddress);
    assert_eq!(out.recipients["alice.1"], MentionClass::DirectAddress);
    assert_eq!(out.recipients["alice.2"], MentionClass::DirectAddress);
}

#[test]
fn variant_mention_notifies_parent() {
    let agents = [agent("alice"), agent("alice.1")];
    let out = classify("@alice.1 take this", &ctx("bob", &agents));
    assert_eq!(out.recipients["alice.1"], MentionClass::DirectAddress);
    assert_eq!(out.recipients["alice"], MentionClass::CcFyi);
}

#[test]
fn bare_mention_with_live_workers_is_ambiguous() {
    let agents = [agent("dev"), worker("dev[ab12-0]"), worker("dev[ab12-1]")];
    let out = classify("@dev hey", &ctx("bob", &agents));
    assert!(out.is_ambiguous());
    assert_eq!(out.recipients["dev"], MentionClass::Ambiguous);
    assert_eq!(
        out.diagnostics[0].candidates,
        vec!["dev[ab12-0]", "dev[ab12-1]"]
    );
}

#[test]
fn explicit_worker_mention_is_unambiguous() {
    let agents = [agent("dev"), worker("dev[ab12-0]"), worker("dev[ab12-1]")];
    let out = classify("@dev[ab12-0] hey", &ctx("bob", &agents));
    assert!(!out.is_ambiguous());
    assert_eq!(out.recipients["dev[ab12-0]"], MentionClass::DirectAddress);
}

#[test]
fn departed_workers_do_not_create_ambiguity() {
    let mut gone = worker("dev[ab12-0]");
    gone.left_at = Some(1_700_000_500);
    let agents = [agent("dev"), gone];
    let out = classify("@dev hey", &ctx("bob", &agents));
    assert!(!out.is_ambiguous());
    assert_eq!(out.recipients["dev"], MentionClass::DirectAddress);
}

#[test]
fn fork_session_collected() {
    let agents = [agent("alice")];
    let out = classify("@alice#a7f3 continue from there", &ctx("bob", &agents));
    assert_eq!(out.fork_sessions["alice"], "a7f3");
    assert_eq!(out.recipients["alice"], MentionClass::DirectAddress);
}

#[test]
fn host_filter_drops_remote_mentions() {
    let agents = [agent("alice")];
    let out = classify("@alice@elsewhere ping", &ctx("bob", &agents));
    assert!(out.recipients.is_empty());

    let out = classify("@alice@m1 ping", &ctx("bob", &agents));
    assert_eq!(out.recipients["alice"], MentionClass::DirectAddress);

    let out = classify("@alice@all ping", &ctx("bob", &agents));
    assert_eq!(out.recipients["alice"], MentionClass::DirectAddress);
}

#[test]
fn encode_qualifies_bare_mentions() {
    let machine = fray_core::MachineId::new("m1");
    assert_eq!(
        encode_mentions("@alice ping", &machine),
        "@alice@m1 ping"
    );
    assert_eq!(
        encode_mentions("@alice@laptop ping", &machine),
        "@alice@laptop ping"
    );
    assert_eq!(encode_mentions("@all ping", &machine), "@all ping");
    assert_eq!(
        encode_mentions("@alice#a7f ping", &machine),
        "@alice@m1#a7f ping"
    );
    assert_eq!(encode_mentions("no mentions here", &machine), "no mentions here");
}

#[test]
fn unregistered_mention_still_listed() {
    let agents = [agent("alice")];
    let out = classify("@ghost are you there", &ctx("bob", &agents));
    // Recipient recorded so watermarks advance; spawn decisions skip it
    assert_eq!(out.recipients["ghost"], MentionClass::DirectAddress);
    assert_eq!(out.mention_list(), vec!["ghost"]);
}
