//! The default `advisory` registry fixture never satisfies every
//! promotion gate (no drill history, no outcome-reliability samples), so
//! `promotion-gates --fail-on-hold` must exit 2 and `promotion-apply` must
//! refuse with exit 7 rather than silently applying.

use crate::prelude::*;
use ops_core::test_support::registry_fixture;

fn seeded(project: &Project) {
    project.write_json(project.repo().fleet_registry_json(), &registry_fixture("fleet-a", &["loop-a"]));
}

#[test]
fn fail_on_hold_exits_gated_hold() {
    let project = Project::empty();
    seeded(&project);

    let finished = project.ops_manager().args(["promotion-gates"]).passes();
    assert_eq!(finished.json()["decision"], "hold");

    let finished = project.ops_manager().args(["promotion-gates", "--fail-on-hold"]).fails();
    assert_eq!(finished.exit_code(), 2);
}

#[test]
fn apply_on_a_held_gate_report_exits_policy_mismatch() {
    let project = Project::empty();
    seeded(&project);

    let finished = project
        .ops_manager()
        .args([
            "promotion-apply",
            "resume",
            "--by",
            "operator-1",
            "--approval-ref",
            "approval-1",
            "--rationale",
            "unblock the loop",
            "--review-by",
            "2026-12-31T00:00:00Z",
            "--idempotency-key",
            "apply-1",
        ])
        .fails();
    assert_eq!(finished.exit_code(), 7);
}
