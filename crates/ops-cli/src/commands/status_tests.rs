use super::*;
use ops_core::model::snapshot::{Cursor, GateSummary, LoopRunSnapshot, LoopStatus, RuntimeProjection, SnapshotSource};
use ops_core::model::SchemaVersion;
use ops_core::repo::Repo;
use ops_core::test_support::registry_fixture;

use crate::config::OpsManagerConfig;

fn fixture_snapshot(loop_id: &str) -> LoopRunSnapshot {
    LoopRunSnapshot {
        schema_version: SchemaVersion::V1,
        envelope_type: "loop_run_snapshot".into(),
        trace_id: "trace-1".into(),
        source: SnapshotSource { repo: "repo-a".into(), loop_id: loop_id.into() },
        runtime: RuntimeProjection {
            status: LoopStatus::Running,
            last_event_at: "2026-01-01T00:00:00Z".into(),
            iteration: 1,
            run_id: "run-1".into(),
            loop_id: loop_id.into(),
        },
        gate_summary: GateSummary::default(),
        stuck_streak: 0,
        cursor: Cursor::new(0),
        runtime_heartbeat: None,
        state_current_loop_id: None,
    }
}

#[tokio::test]
async fn reads_the_stored_snapshot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = Repo::new(dir.path());
    ops_storage::atomic_json::write_json_atomic(&repo.fleet_registry_json(), &registry_fixture("fleet-a", &["loop-a"]))
        .expect("write registry");
    ops_storage::atomic_json::write_json_atomic(&repo.loop_run_summary_json("loop-a"), &fixture_snapshot("loop-a"))
        .expect("write snapshot");

    let ctx = Ctx::new(repo, OpsManagerConfig::default());
    let value = handle(&ctx, "loop-a").await.expect("status");
    assert_eq!(value["source"]["loopId"], "loop-a");
}

#[tokio::test]
async fn missing_run_summary_is_a_usage_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = Repo::new(dir.path());
    ops_storage::atomic_json::write_json_atomic(&repo.fleet_registry_json(), &registry_fixture("fleet-a", &["loop-a"]))
        .expect("write registry");

    let ctx = Ctx::new(repo, OpsManagerConfig::default());
    assert!(handle(&ctx, "loop-a").await.is_err());
}
