// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    operational = { ExitError::Operational("x".into()), 1 },
    guard = { ExitError::Guard("x".into()), 2 },
    usage = { ExitError::Usage("x".into()), 64 },
)]
fn exit_codes(err: ExitError, code: i32) {
    assert_eq!(err.code(), code);
}

#[test]
fn guard_rejection_maps_to_code_2() {
    let err: ExitError = StorageError::GuardRejection("re-sync first".into()).into();
    assert_eq!(err.code(), 2);
}

#[test]
fn other_storage_errors_are_operational() {
    let err: ExitError = StorageError::not_found("message", "msg-x").into();
    assert_eq!(err.code(), 1);
    assert!(err.to_string().contains("msg-x"));
}
