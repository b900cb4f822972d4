// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ops_core::clock::FakeClock;
use ops_core::model::health::HealthStatus;
use ops_core::model::{Sequence, SchemaVersion};
use ops_core::test_support::snapshot_fixture;
use ops_transport::LocalTransport;

fn event(loop_id: &str, seq: u64) -> ops_core::model::LoopRunEvent {
    ops_core::model::LoopRunEvent {
        schema_version: SchemaVersion::V1,
        envelope_type: "loop_run_event".into(),
        trace_id: "trace-1".into(),
        loop_id: loop_id.into(),
        run_id: "run-1".into(),
        iteration: 1,
        sequence: Sequence {
            source: "events".into(),
            value: seq,
        },
        name: "step".into(),
        payload: serde_json::json!({}),
        timestamp: "2026-01-01T00:00:05Z".into(),
    }
}

#[tokio::test]
async fn first_reconcile_persists_state_health_cursor_and_one_telemetry_row() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repo::new(dir.path());
    ops_storage::atomic_json::write_json_atomic(
        &repo.loop_run_summary_json("loop-a"),
        &snapshot_fixture("loop-a", "trace-1", 0),
    )
    .unwrap();

    let transport = LocalTransport::new(repo.clone());
    let reconciler = Reconciler::new(repo.clone(), FakeClock::new());
    let outcome = reconciler
        .reconcile(&transport, "loop-a", "trace-1", &ReconcilerConfig::default())
        .await
        .unwrap();

    assert!(outcome.succeeded);
    assert!(repo.ops_loop_state_json("loop-a").exists());
    assert!(repo.ops_loop_health_json("loop-a").exists());
    assert!(repo.ops_loop_cursor_json("loop-a").exists());
    assert_eq!(
        ops_storage::jsonl::line_count(&repo.ops_loop_telemetry("loop-a", "reconcile")).unwrap(),
        1
    );
}

#[tokio::test]
async fn repeated_reconcile_with_no_new_events_yields_no_new_telemetry() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repo::new(dir.path());
    ops_storage::atomic_json::write_json_atomic(
        &repo.loop_run_summary_json("loop-a"),
        &snapshot_fixture("loop-a", "trace-1", 0),
    )
    .unwrap();

    let transport = LocalTransport::new(repo.clone());
    let clock = FakeClock::new();
    let reconciler = Reconciler::new(repo.clone(), clock);
    let config = ReconcilerConfig::default();

    reconciler.reconcile(&transport, "loop-a", "trace-1", &config).await.unwrap();
    reconciler.reconcile(&transport, "loop-a", "trace-1", &config).await.unwrap();

    assert_eq!(
        ops_storage::jsonl::line_count(&repo.ops_loop_telemetry("loop-a", "reconcile")).unwrap(),
        1
    );
}

#[tokio::test]
async fn repeated_reconcile_with_a_fresh_trace_id_each_call_yields_no_new_telemetry() {
    // The CLI mints a new trace ID per invocation whenever `--trace-id` is
    // omitted, so two idempotent reconciles never share a literal trace_id
    // in practice — only asserting against a repeated literal would miss
    // a `health_changed` check that diffs on it.
    let dir = tempfile::tempdir().unwrap();
    let repo = Repo::new(dir.path());
    ops_storage::atomic_json::write_json_atomic(
        &repo.loop_run_summary_json("loop-a"),
        &snapshot_fixture("loop-a", "trace-1", 0),
    )
    .unwrap();

    let transport = LocalTransport::new(repo.clone());
    let clock = FakeClock::new();
    let reconciler = Reconciler::new(repo.clone(), clock);
    let config = ReconcilerConfig::default();

    reconciler.reconcile(&transport, "loop-a", "trace-aaa", &config).await.unwrap();
    reconciler.reconcile(&transport, "loop-a", "trace-bbb", &config).await.unwrap();

    assert_eq!(
        ops_storage::jsonl::line_count(&repo.ops_loop_telemetry("loop-a", "reconcile")).unwrap(),
        1
    );
}

#[tokio::test]
async fn new_events_advance_cursor_and_append_a_second_telemetry_row() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repo::new(dir.path());
    ops_storage::atomic_json::write_json_atomic(
        &repo.loop_run_summary_json("loop-a"),
        &snapshot_fixture("loop-a", "trace-1", 0),
    )
    .unwrap();

    let transport = LocalTransport::new(repo.clone());
    let reconciler = Reconciler::new(repo.clone(), FakeClock::new());
    let config = ReconcilerConfig::default();
    let first = reconciler.reconcile(&transport, "loop-a", "trace-1", &config).await.unwrap();
    assert_eq!(first.cursor.event_line_offset, 0);

    ops_storage::jsonl::append_line(&repo.loop_events_jsonl("loop-a"), &event("loop-a", 1)).unwrap();
    ops_storage::atomic_json::write_json_atomic(
        &repo.loop_run_summary_json("loop-a"),
        &snapshot_fixture("loop-a", "trace-1", 1),
    )
    .unwrap();

    let second = reconciler.reconcile(&transport, "loop-a", "trace-1", &config).await.unwrap();
    assert_eq!(second.cursor.event_line_offset, 1);
    assert_eq!(
        ops_storage::jsonl::line_count(&repo.ops_loop_telemetry("loop-a", "reconcile")).unwrap(),
        2
    );
}

#[tokio::test]
async fn transport_failure_is_recorded_without_advancing_the_cursor() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repo::new(dir.path());
    let transport = LocalTransport::new(repo.clone());
    let reconciler = Reconciler::new(repo.clone(), FakeClock::new());

    let outcome = reconciler
        .reconcile(&transport, "loop-a", "trace-1", &ReconcilerConfig::default())
        .await
        .unwrap();

    assert!(!outcome.succeeded);
    assert_eq!(outcome.reason_code.as_deref(), Some("transport_unreachable"));
    assert_eq!(outcome.cursor.event_line_offset, 0);
    assert!(!repo.ops_loop_state_json("loop-a").exists());
}

#[tokio::test]
async fn consecutive_transport_failures_escalate_to_critical_and_emit_an_escalation_row() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repo::new(dir.path());
    let transport = LocalTransport::new(repo.clone());
    let reconciler = Reconciler::new(repo.clone(), FakeClock::new());
    let config = ReconcilerConfig::default();

    let first = reconciler.reconcile(&transport, "loop-a", "trace-1", &config).await.unwrap();
    assert_eq!(first.health.status, HealthStatus::Healthy);

    let second = reconciler.reconcile(&transport, "loop-a", "trace-1", &config).await.unwrap();
    assert_eq!(second.health.status, HealthStatus::Critical);

    let escalations = ops_storage::jsonl::read_since(&repo.ops_loop_escalations_jsonl("loop-a"), 0).unwrap();
    assert!(escalations.iter().any(|(_, raw)| raw.contains("health_critical")));
}
