// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ops_core::model::health::ThresholdProfile;
use ops_core::model::projection::{Confidence, Divergence, DivergenceFlags, Transition};
use ops_core::model::snapshot::Cursor;
use chrono::Duration;
use proptest::prelude::*;

fn base_projected() -> ProjectedState {
    ProjectedState {
        projection: serde_json::json!({}),
        transition: Transition {
            current_state: "running".into(),
            triggering_signal: "snapshot".into(),
            confidence: Confidence::High,
        },
        divergence: Divergence::from_flags(DivergenceFlags::default()),
        cursor: Cursor::new(5),
        trace_id: "trace-1".into(),
    }
}

fn now() -> DateTime<Utc> {
    "2026-01-01T00:10:00Z".parse().unwrap()
}

#[test]
fn healthy_when_nothing_is_stale_or_failing() {
    let projected = base_projected();
    let health = evaluate(EvaluatorInput {
        projected: &projected,
        thresholds: ThresholdProfile::Balanced.resolve(),
        now: now(),
        last_event_at: Some(now()),
        heartbeat_at: Some(now()),
        transport_failure_streak: 0,
        sequence_state: &SequenceState::default(),
        control_ambiguous: false,
    });
    assert_eq!(health.status, HealthStatus::Healthy);
    assert!(health.reason_codes.is_empty());
}

#[test]
fn stale_ingest_degrades_with_correct_reason_code() {
    let projected = base_projected();
    let stale_event_at = "2026-01-01T00:00:00Z".parse().unwrap();
    let health = evaluate(EvaluatorInput {
        projected: &projected,
        thresholds: ThresholdProfile::Strict.resolve(),
        now: now(),
        last_event_at: Some(stale_event_at),
        heartbeat_at: None,
        transport_failure_streak: 0,
        sequence_state: &SequenceState::default(),
        control_ambiguous: false,
    });
    assert_eq!(health.status, HealthStatus::Degraded);
    assert!(health.reason_codes.contains(&ReasonCode::IngestStale));
}

#[test]
fn transport_failure_streak_at_critical_threshold_is_critical() {
    let projected = base_projected();
    let thresholds = ThresholdProfile::Strict.resolve();
    let health = evaluate(EvaluatorInput {
        projected: &projected,
        thresholds,
        now: now(),
        last_event_at: Some(now()),
        heartbeat_at: Some(now()),
        transport_failure_streak: thresholds.critical_transport_failure_streak,
        sequence_state: &SequenceState::default(),
        control_ambiguous: false,
    });
    assert_eq!(health.status, HealthStatus::Critical);
    assert!(health.reason_codes.contains(&ReasonCode::TransportUnreachable));
}

#[test]
fn divergence_detected_reason_code_tracks_divergence_any() {
    let mut projected = base_projected();
    let mut flags = DivergenceFlags::default();
    flags.state_loop_run_mismatch = true;
    projected.divergence = Divergence::from_flags(flags);
    let health = evaluate(EvaluatorInput {
        projected: &projected,
        thresholds: ThresholdProfile::Balanced.resolve(),
        now: now(),
        last_event_at: Some(now()),
        heartbeat_at: Some(now()),
        transport_failure_streak: 0,
        sequence_state: &SequenceState::default(),
        control_ambiguous: false,
    });
    assert!(health.reason_codes.contains(&ReasonCode::DivergenceDetected));
}

#[test]
fn never_raises_a_reason_code_outside_the_closed_set() {
    let mut projected = base_projected();
    let mut flags = DivergenceFlags::default();
    flags.approval_completion_conflict = true;
    projected.divergence = Divergence::from_flags(flags);
    let mut sequence_state = SequenceState::default();
    sequence_state.drift_active = true;

    let health = evaluate(EvaluatorInput {
        projected: &projected,
        thresholds: ThresholdProfile::Strict.resolve(),
        now: now(),
        last_event_at: Some("2026-01-01T00:00:00Z".parse().unwrap()),
        heartbeat_at: Some("2026-01-01T00:00:00Z".parse().unwrap()),
        transport_failure_streak: 5,
        sequence_state: &sequence_state,
        control_ambiguous: true,
    });

    let closed_set = [
        ReasonCode::IngestStale,
        ReasonCode::RuntimeHeartbeatStale,
        ReasonCode::TransportUnreachable,
        ReasonCode::OrderingDriftDetected,
        ReasonCode::ControlAmbiguous,
        ReasonCode::ApprovalCompletionConflict,
        ReasonCode::DivergenceDetected,
    ];
    for code in &health.reason_codes {
        assert!(closed_set.contains(code));
    }
}

fn arb_divergence_flags() -> impl Strategy<Value = DivergenceFlags> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(approval_completion_conflict, cursor_regression, state_loop_run_mismatch)| DivergenceFlags {
            approval_completion_conflict,
            cursor_regression,
            state_loop_run_mismatch,
        },
    )
}

fn arb_input(
    divergence_flags: DivergenceFlags,
    drift_active: bool,
    event_lag_seconds: i64,
    heartbeat_lag_seconds: i64,
) -> (ProjectedState, SequenceState, DateTime<Utc>, Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let mut projected = base_projected();
    projected.divergence = Divergence::from_flags(divergence_flags);
    let mut sequence_state = SequenceState::default();
    sequence_state.drift_active = drift_active;
    let reference = now();
    let last_event_at = Some(reference - Duration::seconds(event_lag_seconds));
    let heartbeat_at = Some(reference - Duration::seconds(heartbeat_lag_seconds));
    (projected, sequence_state, reference, last_event_at, heartbeat_at)
}

proptest! {
    #[test]
    fn evaluate_is_deterministic_for_identical_inputs(
        flags in arb_divergence_flags(),
        drift_active in any::<bool>(),
        transport_failure_streak in 0u32..10,
        control_ambiguous in any::<bool>(),
        event_lag_seconds in 0i64..7200,
        heartbeat_lag_seconds in 0i64..7200,
    ) {
        let (projected, sequence_state, reference, last_event_at, heartbeat_at) =
            arb_input(flags, drift_active, event_lag_seconds, heartbeat_lag_seconds);
        let thresholds = ThresholdProfile::Balanced.resolve();

        let first = evaluate(EvaluatorInput {
            projected: &projected,
            thresholds,
            now: reference,
            last_event_at,
            heartbeat_at,
            transport_failure_streak,
            sequence_state: &sequence_state,
            control_ambiguous,
        });
        let second = evaluate(EvaluatorInput {
            projected: &projected,
            thresholds,
            now: reference,
            last_event_at,
            heartbeat_at,
            transport_failure_streak,
            sequence_state: &sequence_state,
            control_ambiguous,
        });

        prop_assert_eq!(first.status, second.status);
        prop_assert_eq!(first.reason_codes, second.reason_codes);
    }

    #[test]
    fn reason_codes_always_stay_within_the_closed_set(
        flags in arb_divergence_flags(),
        drift_active in any::<bool>(),
        transport_failure_streak in 0u32..10,
        control_ambiguous in any::<bool>(),
        event_lag_seconds in 0i64..7200,
        heartbeat_lag_seconds in 0i64..7200,
    ) {
        let (projected, sequence_state, reference, last_event_at, heartbeat_at) =
            arb_input(flags, drift_active, event_lag_seconds, heartbeat_lag_seconds);

        let health = evaluate(EvaluatorInput {
            projected: &projected,
            thresholds: ThresholdProfile::Strict.resolve(),
            now: reference,
            last_event_at,
            heartbeat_at,
            transport_failure_streak,
            sequence_state: &sequence_state,
            control_ambiguous,
        });

        let closed_set = [
            ReasonCode::IngestStale,
            ReasonCode::RuntimeHeartbeatStale,
            ReasonCode::TransportUnreachable,
            ReasonCode::OrderingDriftDetected,
            ReasonCode::ControlAmbiguous,
            ReasonCode::ApprovalCompletionConflict,
            ReasonCode::DivergenceDetected,
        ];
        for code in &health.reason_codes {
            prop_assert!(closed_set.contains(code));
        }

        // status is always at least as bad as the worst contributing reason code's minimum,
        // and at least Critical once the critical transport-failure streak is crossed.
        let mut worst = health
            .reason_codes
            .iter()
            .fold(HealthStatus::Healthy, |acc, code| acc.worst(code.minimum_status()));
        if transport_failure_streak >= ThresholdProfile::Strict.resolve().critical_transport_failure_streak {
            worst = worst.worst(HealthStatus::Critical);
        }
        prop_assert_eq!(health.status, worst);
    }
}
