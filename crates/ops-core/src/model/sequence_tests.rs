// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn observe_snapshot_advances_on_in_order_values() {
    let mut state = SequenceState::default();
    state.observe_snapshot(5);
    assert_eq!(state.last_snapshot_sequence, 5);
    assert!(!state.drift_active);
}

#[test]
fn observe_snapshot_flags_regression_without_discarding_prior_value() {
    let mut state = SequenceState::default();
    state.observe_snapshot(5);
    state.observe_snapshot(3);
    assert_eq!(state.last_snapshot_sequence, 5, "regression must not move the cursor backwards");
    assert!(state.drift_active);
    assert!(state.violations.contains(VIOLATION_SNAPSHOT_SEQUENCE_REGRESSION));
}

#[test]
fn observe_event_flags_regression() {
    let mut state = SequenceState::default();
    state.observe_event(10);
    state.observe_event(9);
    assert!(state.violations.contains(VIOLATION_EVENT_SEQUENCE_REGRESSION));
}

#[test]
fn clear_drift_resets_flag_but_keeps_violation_history() {
    let mut state = SequenceState::default();
    state.observe_snapshot(5);
    state.observe_snapshot(1);
    assert!(state.drift_active);
    state.clear_drift();
    assert!(!state.drift_active);
    assert!(!state.violations.is_empty());
}
