//! S4: two loops, one missing its run-summary artifact and one healthy —
//! the fleet reports `partial_failure` with both results present in
//! registry order.

use crate::prelude::*;
use ops_core::test_support::{registry_fixture, snapshot_fixture};

#[test]
fn one_missing_loop_yields_partial_failure() {
    let project = Project::empty();
    let repo = project.repo();

    project.write_json(repo.fleet_registry_json(), &registry_fixture("fleet-a", &["loop-a", "loop-b"]));

    let now = chrono::Utc::now().to_rfc3339();
    let mut snapshot = snapshot_fixture("loop-b", "trace-seed", 0);
    snapshot.runtime.last_event_at = now.clone();
    snapshot.runtime_heartbeat = Some(ops_core::model::snapshot::RuntimeHeartbeat { last_beat_at: now });
    project.write_json(repo.loop_run_summary_json("loop-b"), &snapshot);
    // loop-a deliberately has no run-summary on disk.

    let finished = project.ops_manager().args(["fleet-reconcile", "--deterministic-order"]).passes();
    let state = finished.json();

    assert_eq!(state["status"], "partial_failure");
    let results = state["results"].as_array().expect("results array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["loopId"], "loop-a");
    assert_eq!(results[0]["status"], "failed");
    assert_eq!(results[1]["loopId"], "loop-b");
    assert_eq!(results[1]["status"], "success");

    let status_finished = project.ops_manager().args(["fleet-status"]).passes();
    assert_eq!(status_finished.json()["status"], "partial_failure");
}
