// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    message = { IdKind::Message, "msg" },
    thread = { IdKind::Thread, "thrd" },
    user = { IdKind::User, "usr" },
    job = { IdKind::Job, "job" },
    question = { IdKind::Question, "qstn" },
    channel = { IdKind::Channel, "ch" },
    attachment = { IdKind::Attachment, "att" },
    wake = { IdKind::Wake, "wake" },
)]
fn kind_prefixes(kind: IdKind, prefix: &str) {
    assert_eq!(kind.prefix(), prefix);
}

#[test]
fn ulid_gen_shape() {
    let gen = UlidGen;
    let id = gen.next(IdKind::Message);
    let (prefix, tail) = id.split_once('-').unwrap();
    assert_eq!(prefix, "msg");
    assert_eq!(tail.len(), ID_TAIL_LEN);
    assert!(tail.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
}

#[test]
fn ulid_gen_unique() {
    let gen = UlidGen;
    let a = gen.next(IdKind::Thread);
    let b = gen.next(IdKind::Thread);
    assert_ne!(a, b);
}

#[test]
fn sequential_gen_deterministic() {
    let gen = SequentialIdGen::new();
    assert_eq!(gen.next(IdKind::Message), "msg-000000000001");
    assert_eq!(gen.next(IdKind::Message), "msg-000000000002");
    assert_eq!(gen.next(IdKind::Wake), "wake-000000000003");
}

#[test]
fn short_id_truncates() {
    assert_eq!("msg-abcdef".short(7), "msg-abc");
    assert_eq!("msg".short(7), "msg");
}

#[test]
fn base36_tail_pads() {
    assert_eq!(base36_tail(0), "000000000000");
    assert_eq!(base36_tail(35), "00000000000z");
    assert_eq!(base36_tail(36), "000000000010");
}
