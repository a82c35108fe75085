// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent address grammar.
//!
//! ```text
//! addr   := '@' agent ('.' variant)* ('[' suffix '-' idx ']')? ('@' host)? ('#' session)?
//! agent  := [a-z][a-z0-9-]*
//! variant:= [a-z0-9-]+
//! suffix := [a-z0-9]{4}
//! idx    := [0-9]+
//! host   := machine-name | domain | git-path
//! ```
//!
//! The parser is total: every input yields either a structured [`Address`]
//! or an [`AddressError`] carrying the offending byte position. All fields
//! are lowercase-normalized. Session references are matched by prefix
//! downstream (`#a7f` matches any session starting with `a7f`).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Job-worker reference inside an address: `[ab12-0]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerRef {
    /// First four base36 characters of the owning job's GUID tail.
    pub suffix: String,
    /// Worker index within the job.
    pub idx: u32,
}

impl fmt::Display for WorkerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{}]", self.suffix, self.idx)
    }
}

/// A parsed agent address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// Base agent name, lowercase.
    pub agent: String,
    /// Subagent variants (`@alice.1` has variants `["1"]`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<String>,
    /// Job-worker reference, if addressed as `@dev[ab12-0]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<WorkerRef>,
    /// Target machine (`@agent@host`); `all` broadcasts to every machine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Session prefix for fork-with-context (`@agent#a7f`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

impl Address {
    /// Build a bare address for an agent name.
    pub fn bare(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            variants: Vec::new(),
            worker: None,
            host: None,
            session: None,
        }
    }

    /// Full dotted agent name including variants (`alice.1.x`), without
    /// worker/host/session qualifiers.
    pub fn dotted_name(&self) -> String {
        if self.variants.is_empty() {
            self.agent.clone()
        } else {
            let mut name = self.agent.clone();
            for v in &self.variants {
                name.push('.');
                name.push_str(v);
            }
            name
        }
    }

    /// The agent id this address resolves to, including any worker suffix
    /// (`dev[ab12-0]`) but excluding host and session qualifiers.
    pub fn agent_id(&self) -> String {
        let mut name = self.dotted_name();
        if let Some(w) = &self.worker {
            name.push_str(&w.to_string());
        }
        name
    }

    /// Whether this is the `@all` broadcast recipient.
    pub fn is_broadcast(&self) -> bool {
        self.agent == "all" && self.variants.is_empty() && self.worker.is_none()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.agent_id())?;
        if let Some(host) = &self.host {
            write!(f, "@{}", host)?;
        }
        if let Some(session) = &self.session {
            write!(f, "#{}", session)?;
        }
        Ok(())
    }
}

/// Address parse failure with the offending byte position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("expected '@' at position {0}")]
    ExpectedAt(usize),
    #[error("agent name must start with a letter (position {0})")]
    AgentStart(usize),
    #[error("empty variant after '.' (position {0})")]
    EmptyVariant(usize),
    #[error("worker suffix must be 4 alphanumeric characters (position {0})")]
    WorkerSuffix(usize),
    #[error("worker index must be numeric (position {0})")]
    WorkerIndex(usize),
    #[error("unterminated worker reference (position {0})")]
    UnterminatedWorker(usize),
    #[error("empty session after '#' (position {0})")]
    EmptySession(usize),
    #[error("unexpected trailing input at position {0}")]
    Trailing(usize),
}

impl AddressError {
    /// Byte offset of the error within the parsed input.
    pub fn position(&self) -> usize {
        match self {
            AddressError::ExpectedAt(p)
            | AddressError::AgentStart(p)
            | AddressError::EmptyVariant(p)
            | AddressError::WorkerSuffix(p)
            | AddressError::WorkerIndex(p)
            | AddressError::UnterminatedWorker(p)
            | AddressError::EmptySession(p)
            | AddressError::Trailing(p) => *p,
        }
    }
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

fn is_host_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'/' | b':')
}

fn is_session_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

/// Take a run of bytes matching `pred` starting at `pos`, lowercased.
fn take_while(bytes: &[u8], pos: usize, pred: fn(u8) -> bool) -> (String, usize) {
    let mut end = pos;
    while end < bytes.len() && pred(bytes[end]) {
        end += 1;
    }
    let run = bytes[pos..end]
        .iter()
        .map(|b| b.to_ascii_lowercase() as char)
        .collect();
    (run, end)
}

/// Parse an address at the start of `input`, returning the address and the
/// number of bytes consumed. Used by the mention scanner, which hands this
/// function arbitrary text beginning at an `@`.
///
/// Optional qualifiers (`.variant`, `[suffix-idx]`, `@host`, `#session`)
/// are only consumed when well-formed; a trailing `.` before whitespace is
/// punctuation, not an empty variant.
pub fn parse_address_prefix(input: &str) -> Result<(Address, usize), AddressError> {
    let bytes = input.as_bytes();

    if bytes.first() != Some(&b'@') {
        return Err(AddressError::ExpectedAt(0));
    }
    let mut pos = 1;

    match bytes.get(pos) {
        Some(b) if b.is_ascii_alphabetic() => {}
        _ => return Err(AddressError::AgentStart(pos)),
    }
    let (agent, next) = take_while(bytes, pos, is_name_char);
    pos = next;

    let mut addr = Address::bare(agent);

    // Variants: consume '.' only when a variant character follows
    while bytes.get(pos) == Some(&b'.') {
        match bytes.get(pos + 1) {
            Some(b) if is_name_char(*b) => {}
            _ => break,
        }
        let (variant, next) = take_while(bytes, pos + 1, is_name_char);
        if variant.is_empty() {
            return Err(AddressError::EmptyVariant(pos + 1));
        }
        addr.variants.push(variant);
        pos = next;
    }

    // Worker reference '[ssss-n]'
    if bytes.get(pos) == Some(&b'[') {
        let open = pos;
        let (suffix, next) = take_while(bytes, pos + 1, |b| b.is_ascii_alphanumeric());
        if suffix.len() != 4 {
            return Err(AddressError::WorkerSuffix(pos + 1));
        }
        pos = next;
        if bytes.get(pos) != Some(&b'-') {
            return Err(AddressError::UnterminatedWorker(open));
        }
        let (idx_str, next) = take_while(bytes, pos + 1, |b| b.is_ascii_digit());
        let idx: u32 = idx_str
            .parse()
            .map_err(|_| AddressError::WorkerIndex(pos + 1))?;
        pos = next;
        if bytes.get(pos) != Some(&b']') {
            return Err(AddressError::UnterminatedWorker(open));
        }
        pos += 1;
        addr.worker = Some(WorkerRef { suffix, idx });
    }

    // Host '@machine': only when a host character follows the '@';
    // a bare trailing '@' is surrounding text, not an empty host
    if bytes.get(pos) == Some(&b'@') {
        if let Some(b) = bytes.get(pos + 1) {
            if is_host_char(*b) {
                let (host, next) = take_while(bytes, pos + 1, is_host_char);
                addr.host = Some(host);
                pos = next;
            }
        }
    }

    // Session '#prefix'
    if bytes.get(pos) == Some(&b'#') {
        let (session, next) = take_while(bytes, pos + 1, is_session_char);
        if session.is_empty() {
            return Err(AddressError::EmptySession(pos + 1));
        }
        addr.session = Some(session);
        pos = next;
    }

    Ok((addr, pos))
}

/// Parse a complete address, rejecting trailing input.
pub fn parse_address(input: &str) -> Result<Address, AddressError> {
    let (addr, consumed) = parse_address_prefix(input)?;
    if consumed != input.len() {
        return Err(AddressError::Trailing(consumed));
    }
    Ok(addr)
}

#[cfg(test)]
#[path = "address_tests.rs"]
mod tests;
