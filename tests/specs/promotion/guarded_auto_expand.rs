//! S5: a registry in `guarded_auto` with a fully-satisfied gate set
//! (governance, outcome reliability, safety-suppression coverage, drill
//! recency) promotes, and `promotion-apply expand` advances the rollout's
//! canary percentage.

use crate::prelude::*;
use ops_core::model::handoff::HandoffStatus;
use serde_json::json;

fn seed_registry(project: &Project) {
    let registry = json!({
        "fleetId": "fleet-a",
        "loops": [{"loopId": "loop-a", "transport": "local", "service": null, "enabled": true}],
        "policy": {
            "mode": "guarded_auto",
            "suppressions": {},
            "noiseControls": {"dedupeWindowSeconds": 300},
            "autonomous": {
                "governance": {
                    "actor": "operator-1",
                    "approvalRef": "approval-0",
                    "rationale": "initial rollout",
                    "changedAt": "2026-01-01T00:00:00Z",
                    "reviewBy": "2030-01-01T00:00:00Z",
                    "authorityContext": null
                },
                "allow": {"categories": ["routine"], "intents": ["pause"]},
                "thresholds": {"minSeverity": "warning", "minConfidence": "low"},
                "safety": {
                    "maxActionsPerRun": 5,
                    "maxActionsPerLoop": 2,
                    "cooldownSeconds": 60,
                    "killSwitch": false
                },
                "rollout": {
                    "canaryPercent": 25,
                    "scope": {"loopIds": []},
                    "selector": {"salt": "fleet-a"},
                    "pause": {"manual": false, "auto": null}
                }
            }
        }
    });
    project.write_json(project.repo().fleet_registry_json(), &registry);
}

fn seed_outcome_reliability(project: &Project) {
    let path = project.repo().fleet_telemetry("handoff");
    for _ in 0..10 {
        ops_storage::jsonl::append_line(&path, &json!({ "status": HandoffStatus::Executed })).expect("seed handoff telemetry");
    }
}

fn seed_safety_suppression(project: &Project) {
    let policy_state = json!({
        "reasonCodes": [],
        "summary": {
            "byAutonomyReason": {
                "autonomous_max_actions_per_run_exceeded": 1,
                "autonomous_rollout_canary_excluded": 1,
                "autonomous_mode_not_guarded": 1,
                "autonomous_retry_guard_ambiguous": 1
            }
        }
    });
    project.write_json(project.repo().fleet_policy_state_json(), &policy_state);
}

fn seed_drills(project: &Project) {
    let drill_state = json!({
        "drills": [
            {"drillId": "kill_switch", "status": "pass", "completedAt": "2026-07-20T00:00:00Z"},
            {"drillId": "sprite_service_outage", "status": "pass", "completedAt": "2026-07-20T00:00:00Z"},
            {"drillId": "ambiguous_retry_guard", "status": "pass", "completedAt": "2026-07-20T00:00:00Z"}
        ]
    });
    project.write_json(project.repo().fleet_drill_state_json(), &drill_state);
}

#[test]
fn promote_decision_and_expand_apply_advance_canary() {
    let project = Project::empty();
    seed_registry(&project);
    seed_outcome_reliability(&project);
    seed_safety_suppression(&project);
    seed_drills(&project);

    let gates = project.ops_manager().args(["promotion-gates"]).passes();
    assert_eq!(gates.json()["decision"], "promote");

    let apply = project
        .ops_manager()
        .args([
            "promotion-apply",
            "expand",
            "50",
            "--by",
            "operator-2",
            "--approval-ref",
            "approval-1",
            "--rationale",
            "canary is healthy, widen rollout",
            "--review-by",
            "2030-06-01T00:00:00Z",
            "--idempotency-key",
            "expand-1",
        ])
        .passes();
    assert_eq!(apply.json()["gates"]["decision"], "promote");
    assert_eq!(apply.json()["applied"]["replayed"], false);

    let registry: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(project.repo().fleet_registry_json()).expect("read registry")).expect("parse registry");
    assert_eq!(registry["policy"]["autonomous"]["rollout"]["canaryPercent"], 75);
}
