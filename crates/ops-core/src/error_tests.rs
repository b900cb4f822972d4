// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn validation_error_renders_field_and_message() {
    let err = AppError::validation("mode", "unknown policy mode");
    assert_eq!(
        err.to_string(),
        "validation failed for mode: unknown policy mode"
    );
}

#[test]
fn io_error_carries_path() {
    let source = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err = AppError::io("/tmp/state.json", source);
    assert!(err.to_string().contains("/tmp/state.json"));
}

#[test]
fn toml_errors_are_fatal_to_invocation() {
    let parsed: Result<toml::Value, _> = toml::from_str("not = [valid");
    let toml_err = parsed.unwrap_err();
    let err = AppError::from(toml_err);
    assert!(err.is_fatal_to_invocation());
}

#[test]
fn transport_errors_are_not_fatal_to_invocation() {
    let err = AppError::transport("connection refused");
    assert!(!err.is_fatal_to_invocation());
}
