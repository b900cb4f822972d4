// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ops_core::clock::FakeClock;
use ops_core::model::registry::{ServiceConfig, TransportKind};
use ops_core::test_support::{registry_fixture, snapshot_fixture};

#[test]
fn rejects_sprite_service_loop_without_base_url() {
    let mut registry = registry_fixture("fleet-1", &["loop-a"]);
    registry.loops[0].transport = TransportKind::SpriteService;
    registry.loops[0].service = Some(ServiceConfig {
        base_url: None,
        token_env: None,
    });
    let err = validate_registry(&registry).unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
}

#[test]
fn rejects_unknown_suppression_category() {
    let mut registry = registry_fixture("fleet-1", &["loop-a"]);
    registry
        .policy
        .suppressions
        .insert("*".into(), std::iter::once("not_a_real_category".to_string()).collect());
    let err = validate_registry(&registry).unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
}

#[tokio::test]
async fn partial_failure_rolls_up_when_one_loop_has_no_run_summary() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repo::new(dir.path());
    ops_storage::atomic_json::write_json_atomic(
        &repo.loop_run_summary_json("loop-a"),
        &snapshot_fixture("loop-a", "trace-1", 0),
    )
    .unwrap();
    // loop-b has no run-summary.json: its reconcile will fail.

    let registry = registry_fixture("fleet-1", &["loop-a", "loop-b"]);
    let config = ReconcilerConfig::default();
    let state = reconcile_fleet(
        &repo,
        FakeClock::new(),
        FleetReconcileInput {
            registry: &registry,
            trace_id: "fleet-trace",
            deterministic_order: true,
            max_parallel: 4,
            config: &config,
        },
    )
    .await
    .unwrap();

    assert_eq!(state.status, FleetStatus::PartialFailure);
    assert!(state.reason_codes.contains("fleet_partial_failure"));
    assert_eq!(state.results.len(), 2);
    assert_eq!(state.results[0].loop_id, "loop-a");
    assert_eq!(state.results[0].status, "success");
    assert_eq!(state.results[1].loop_id, "loop-b");
    assert_eq!(state.results[1].status, "failed");
}

#[tokio::test]
async fn deterministic_order_sorts_results_lexicographically_by_loop_id() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repo::new(dir.path());
    for loop_id in ["loop-c", "loop-a", "loop-b"] {
        ops_storage::atomic_json::write_json_atomic(
            &repo.loop_run_summary_json(loop_id),
            &snapshot_fixture(loop_id, "trace-1", 0),
        )
        .unwrap();
    }

    let registry = registry_fixture("fleet-1", &["loop-c", "loop-a", "loop-b"]);
    let config = ReconcilerConfig::default();
    let state = reconcile_fleet(
        &repo,
        FakeClock::new(),
        FleetReconcileInput {
            registry: &registry,
            trace_id: "fleet-trace",
            deterministic_order: true,
            max_parallel: 2,
            config: &config,
        },
    )
    .await
    .unwrap();

    let ids: Vec<&str> = state.results.iter().map(|r| r.loop_id.as_str()).collect();
    assert_eq!(ids, vec!["loop-a", "loop-b", "loop-c"]);
    assert_eq!(state.status, FleetStatus::Success);
}

#[tokio::test]
async fn all_loops_succeeding_writes_fleet_state_json() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repo::new(dir.path());
    ops_storage::atomic_json::write_json_atomic(
        &repo.loop_run_summary_json("loop-a"),
        &snapshot_fixture("loop-a", "trace-1", 0),
    )
    .unwrap();

    let registry = registry_fixture("fleet-1", &["loop-a"]);
    let config = ReconcilerConfig::default();
    reconcile_fleet(
        &repo,
        FakeClock::new(),
        FleetReconcileInput {
            registry: &registry,
            trace_id: "fleet-trace",
            deterministic_order: true,
            max_parallel: 1,
            config: &config,
        },
    )
    .await
    .unwrap();

    assert!(repo.fleet_state_json().exists());
}
