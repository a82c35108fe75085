// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mention extraction and recipient classification.
//!
//! Given a posted message body, compute recipient → class: leading
//! mentions are direct addresses, mid-sentence (or `fyi`/`cc`/`heads up`
//! prefixed) mentions are CC and never wake, `@all` broadcasts, reply
//! parents propagate, and bare mentions that collide with live job
//! workers are ambiguous and reject the post.

use fray_core::address::{parse_address_prefix, Address};
use fray_core::{AgentRecord, MachineId};
use std::collections::{BTreeMap, HashMap};

/// Recipient classification, ordered weakest to strongest. When one
/// recipient is reached through several routes the strongest class wins;
/// self-mentions override everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MentionClass {
    None,
    CcFyi,
    ReplyChain,
    Broadcast,
    DirectAddress,
    Ambiguous,
    SelfMention,
}

impl MentionClass {
    pub fn as_str(self) -> &'static str {
        match self {
            MentionClass::None => "none",
            MentionClass::CcFyi => "cc_fyi",
            MentionClass::ReplyChain => "reply_chain",
            MentionClass::Broadcast => "broadcast",
            MentionClass::DirectAddress => "direct_address",
            MentionClass::Ambiguous => "ambiguous",
            MentionClass::SelfMention => "self",
        }
    }

    /// Classes that never cause a spawn.
    pub fn is_inert(self) -> bool {
        matches!(
            self,
            MentionClass::None
                | MentionClass::CcFyi
                | MentionClass::Ambiguous
                | MentionClass::SelfMention
        )
    }
}

impl std::fmt::Display for MentionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One extracted mention with its byte offset in the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionHit {
    pub offset: usize,
    pub address: Address,
}

/// A bare mention that matched several live job workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disambiguation {
    pub mention: String,
    pub candidates: Vec<String>,
}

/// Output of classification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Recipient agent id → class, deterministic order.
    pub recipients: BTreeMap<String, MentionClass>,
    pub diagnostics: Vec<Disambiguation>,
    /// Whether an `@all` broadcast is pending expansion at wake time.
    pub broadcast: bool,
    /// Recipient → prior session id, from `@agent#sess` fork syntax.
    pub fork_sessions: HashMap<String, String>,
}

impl Classification {
    /// Post must be rejected with a disambiguation error.
    pub fn is_ambiguous(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Resolved mention list for persistence on the message row.
    pub fn mention_list(&self) -> Vec<String> {
        self.recipients.keys().cloned().collect()
    }
}

/// Everything classification needs to know about the surrounding state.
pub struct ClassifyContext<'a> {
    /// Author of the posted message (no leading `@`).
    pub from_agent: &'a str,
    /// Authors up the reply chain, nearest parent first, already bounded
    /// to depth 5 by the caller's walk.
    pub reply_chain_authors: &'a [String],
    /// Registered agents.
    pub agents: &'a [AgentRecord],
    /// This machine's id, for host filtering.
    pub machine: &'a str,
}

/// Scan a body for `@` followed by the address grammar. Invalid
/// candidates (lone `@`, `@123`) are skipped, not errors.
pub fn extract_mentions(body: &str) -> Vec<MentionHit> {
    let bytes = body.as_bytes();
    let mut hits = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'@' {
            pos += 1;
            continue;
        }
        // Emails and mid-word '@' are not mentions
        if pos > 0 && bytes[pos - 1].is_ascii_alphanumeric() {
            pos += 1;
            continue;
        }
        match parse_address_prefix(&body[pos..]) {
            Ok((address, consumed)) => {
                hits.push(MentionHit {
                    offset: pos,
                    address,
                });
                pos += consumed;
            }
            Err(_) => pos += 1,
        }
    }
    hits
}

/// Rewrite unqualified mentions for multi-machine routing: `@agent`
/// becomes `@agent@<machine>`. Qualified mentions (`@agent@all`,
/// `@agent@host`) pass through untouched.
pub fn encode_mentions(body: &str, machine: &MachineId) -> String {
    let hits = extract_mentions(body);
    let mut encoded = String::with_capacity(body.len());
    let mut cursor = 0;

    for hit in &hits {
        let end = hit.offset + mention_len(body, hit);
        encoded.push_str(&body[cursor..end]);
        if hit.address.host.is_none() && !hit.address.is_broadcast() {
            // Session suffix sorts after host in the grammar, so insert
            // before any '#'
            if let Some(session) = &hit.address.session {
                let session_suffix = format!("#{session}");
                if let Some(stripped) = encoded.strip_suffix(&session_suffix) {
                    let base = stripped.len();
                    encoded.truncate(base);
                    encoded.push('@');
                    encoded.push_str(machine.as_str());
                    encoded.push_str(&session_suffix);
                }
            } else {
                encoded.push('@');
                encoded.push_str(machine.as_str());
            }
        }
        cursor = end;
    }
    encoded.push_str(&body[cursor..]);
    encoded
}

fn mention_len(body: &str, hit: &MentionHit) -> usize {
    parse_address_prefix(&body[hit.offset..])
        .map(|(_, consumed)| consumed)
        .unwrap_or(1)
}

/// Whether an address targets this machine.
pub fn is_local(address: &Address, machine: &str) -> bool {
    match address.host.as_deref() {
        None => true,
        Some("all") => true,
        Some(host) => host == machine,
    }
}

const CC_MARKERS: [&str; 3] = ["fyi", "cc", "heads up"];

/// A mention at offset 0, or preceded only by other mentions, whitespace,
/// and separators, is a direct address.
fn is_leading(body: &str, hits: &[MentionHit], index: usize) -> bool {
    let hit = &hits[index];
    let mut cursor = 0;
    for prior in &hits[..index] {
        let between = &body[cursor..prior.offset];
        if !between.chars().all(|c| c.is_whitespace() || c == ',') {
            return false;
        }
        cursor = prior.offset + mention_len(body, prior);
    }
    let between = &body[cursor..hit.offset];
    between.chars().all(|c| c.is_whitespace() || c == ',')
}

/// Whether the text right before a mention is an explicit CC marker.
fn has_cc_marker(body: &str, offset: usize) -> bool {
    let prefix = body[..offset].trim_end();
    let prefix = prefix.trim_end_matches(':').trim_end();
    let lower = prefix.to_lowercase();
    CC_MARKERS
        .iter()
        .any(|marker| lower == *marker || lower.ends_with(&format!(" {marker}")) || lower.ends_with(&format!(",{marker}")))
}

fn upgrade(recipients: &mut BTreeMap<String, MentionClass>, agent: String, class: MentionClass) {
    let entry = recipients.entry(agent).or_insert(class);
    if class > *entry {
        *entry = class;
    }
}

/// Classify every candidate recipient of a message body.
pub fn classify(body: &str, ctx: &ClassifyContext<'_>) -> Classification {
    let hits = extract_mentions(body);
    let mut out = Classification::default();

    for (index, hit) in hits.iter().enumerate() {
        if !is_local(&hit.address, ctx.machine) {
            continue;
        }

        let positional = if is_leading(body, &hits, index) && !has_cc_marker(body, hit.offset) {
            MentionClass::DirectAddress
        } else {
            MentionClass::CcFyi
        };

        if hit.address.is_broadcast() {
            if positional == MentionClass::DirectAddress {
                out.broadcast = true;
                upgrade(&mut out.recipients, "all".to_string(), MentionClass::Broadcast);
            } else {
                upgrade(&mut out.recipients, "all".to_string(), MentionClass::CcFyi);
            }
            continue;
        }

        let target = hit.address.agent_id();

        // Bare base name colliding with live job workers is ambiguous
        if hit.address.worker.is_none() && hit.address.variants.is_empty() {
            let workers: Vec<String> = ctx
                .agents
                .iter()
                .filter(|a| {
                    a.is_ephemeral
                        && a.left_at.is_none()
                        && a.agent_id.as_str().starts_with(&format!("{target}["))
                })
                .map(|a| a.agent_id.to_string())
                .collect();
            if !workers.is_empty() {
                out.diagnostics.push(Disambiguation {
                    mention: target.clone(),
                    candidates: workers,
                });
                upgrade(&mut out.recipients, target, MentionClass::Ambiguous);
                continue;
            }
        }

        if let Some(session) = &hit.address.session {
            out.fork_sessions.insert(target.clone(), session.clone());
        }

        upgrade(&mut out.recipients, target.clone(), positional);

        // Subagent fan-out: @alice covers every registered alice.*
        if hit.address.variants.is_empty() && hit.address.worker.is_none() {
            let prefix = format!("{target}.");
            for agent in ctx.agents {
                if agent.agent_id.as_str().starts_with(&prefix) {
                    upgrade(
                        &mut out.recipients,
                        agent.agent_id.to_string(),
                        positional,
                    );
                }
            }
        }

        // @alice.1 notifies the parent alice without waking it
        if !hit.address.variants.is_empty() {
            let parent = hit.address.agent.clone();
            if ctx.agents.iter().any(|a| a.agent_id == parent.as_str()) {
                upgrade(&mut out.recipients, parent, MentionClass::CcFyi);
            }
        }
    }

    // Reply-chain propagation: ancestors' authors are recipients even
    // without an explicit mention
    for author in ctx.reply_chain_authors {
        upgrade(
            &mut out.recipients,
            author.clone(),
            MentionClass::ReplyChain,
        );
    }

    // Self never wakes, whatever route got us here
    if let Some(class) = out.recipients.get_mut(ctx.from_agent) {
        *class = MentionClass::SelfMention;
    }

    out
}

#[cfg(test)]
#[path = "mention_tests.rs"]
mod tests;
