//! S1: a fresh loop with a recent heartbeat reconciles to `healthy`.

use crate::prelude::*;
use ops_core::test_support::{registry_fixture, snapshot_fixture};

#[test]
fn fresh_loop_reconciles_healthy() {
    let project = Project::empty();
    let repo = project.repo();

    project.write_json(repo.fleet_registry_json(), &registry_fixture("fleet-a", &["loop-a"]));

    let now = chrono::Utc::now().to_rfc3339();
    let mut snapshot = snapshot_fixture("loop-a", "trace-seed", 0);
    snapshot.runtime.last_event_at = now.clone();
    snapshot.runtime_heartbeat = Some(ops_core::model::snapshot::RuntimeHeartbeat { last_beat_at: now });
    project.write_json(repo.loop_run_summary_json("loop-a"), &snapshot);

    let finished = project.ops_manager().args(["reconcile", "loop-a"]).passes();
    let outcome = finished.json();

    assert_eq!(outcome["health"]["status"], "healthy");
    assert_eq!(outcome["health"]["reasonCodes"], serde_json::json!([]));
    assert_eq!(outcome["cursor"]["eventLineOffset"], 0);
}
