//! S2: an event timestamp far older than the `balanced` threshold's
//! `ingestStaleSeconds` (120s) degrades the loop and escalates.

use crate::prelude::*;
use ops_core::test_support::{registry_fixture, snapshot_fixture};

#[test]
fn stale_heartbeat_degrades_and_escalates() {
    let project = Project::empty();
    let repo = project.repo();

    project.write_json(repo.fleet_registry_json(), &registry_fixture("fleet-a", &["loop-a"]));

    let stale = (chrono::Utc::now() - chrono::Duration::seconds(900)).to_rfc3339();
    let mut snapshot = snapshot_fixture("loop-a", "trace-seed", 0);
    snapshot.runtime.last_event_at = stale.clone();
    snapshot.runtime_heartbeat = Some(ops_core::model::snapshot::RuntimeHeartbeat { last_beat_at: stale });
    project.write_json(repo.loop_run_summary_json("loop-a"), &snapshot);

    let finished = project.ops_manager().args(["reconcile", "loop-a"]).passes();
    let outcome = finished.json();

    assert_eq!(outcome["health"]["status"], "degraded");
    assert!(outcome["health"]["reasonCodes"].as_array().expect("array").iter().any(|c| c == "ingest_stale"));

    let escalations = std::fs::read_to_string(repo.ops_loop_escalations_jsonl("loop-a")).expect("escalation log");
    assert_eq!(escalations.lines().count(), 1);
    assert!(escalations.contains("health_degraded"));
}
