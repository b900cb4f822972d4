//! S6: an autonomous `cancel` intent that ends `execution_ambiguous` gets
//! retry-guarded on the next autonomous pass — demoted to manual-only
//! without a second control call, until an operator intervenes.

use crate::prelude::*;
use serde_json::json;
use std::io::Write;

fn seed_registry(project: &Project) {
    let registry = json!({
        "fleetId": "fleet-red",
        "loops": [{"loopId": "loop-red", "transport": "local", "service": null, "enabled": true}],
        "policy": {
            "mode": "guarded_auto",
            "suppressions": {},
            "noiseControls": {"dedupeWindowSeconds": 0},
            "autonomous": {
                "governance": {
                    "actor": "operator-1",
                    "approvalRef": "approval-0",
                    "rationale": "autonomous cancel of reconcile-failed loops",
                    "changedAt": "2026-01-01T00:00:00Z",
                    "reviewBy": "2030-01-01T00:00:00Z",
                    "authorityContext": null
                },
                "allow": {"categories": ["reconcile_failed"], "intents": ["cancel"]},
                "thresholds": {"minSeverity": "warning", "minConfidence": "low"},
                "safety": {
                    "maxActionsPerRun": 5,
                    "maxActionsPerLoop": 5,
                    "cooldownSeconds": 0,
                    "killSwitch": false
                },
                "rollout": null
            }
        }
    });
    project.write_json(project.repo().fleet_registry_json(), &registry);
    // loop-red deliberately has no run-summary, so every reconcile fails transport.
}

fn ambiguous_actuator(dir: &std::path::Path, marker: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("ambiguous_actuator.sh");
    let mut file = std::fs::File::create(&path).expect("create actuator script");
    writeln!(
        file,
        "#!/bin/sh\ncat >/dev/null\necho called >> {}\necho ambiguous",
        marker.display()
    )
    .expect("write actuator script");
    drop(file);
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod actuator script");
    }
    path
}

#[test]
fn second_autonomous_pass_suppresses_the_ambiguous_intent() {
    let project = Project::empty();
    seed_registry(&project);
    let marker = project.path().join("actuator-calls.log");
    let script = ambiguous_actuator(project.path(), &marker);

    project.ops_manager().args(["fleet-reconcile", "--deterministic-order"]).passes();
    project.ops_manager().args(["fleet-policy"]).passes();
    let first_handoff = project
        .ops_manager()
        .env("OPS_MANAGER_CONTROL_SCRIPT", &script)
        .args(["fleet-handoff", "--autonomous-execute"])
        .passes();
    let first_intents = first_handoff.json()["intents"].as_array().expect("intents array").clone();
    assert_eq!(first_intents.len(), 1);
    assert_eq!(first_intents[0]["status"], "execution_ambiguous");
    assert_eq!(first_intents[0]["autonomous"]["eligible"], true);
    assert_eq!(std::fs::read_to_string(&marker).expect("marker after first pass").lines().count(), 1);

    project.ops_manager().args(["fleet-reconcile", "--deterministic-order"]).passes();
    project.ops_manager().args(["fleet-policy"]).passes();
    let second_handoff = project
        .ops_manager()
        .env("OPS_MANAGER_CONTROL_SCRIPT", &script)
        .args(["fleet-handoff", "--autonomous-execute"])
        .passes();
    let second_intents = second_handoff.json()["intents"].as_array().expect("intents array").clone();
    assert_eq!(second_intents.len(), 1);
    assert_eq!(second_intents[0]["autonomous"]["eligible"], false);
    assert_eq!(second_intents[0]["autonomous"]["manualOnly"], true);
    let reasons = second_intents[0]["autonomous"]["reasons"].as_array().expect("reasons array").clone();
    assert!(reasons.iter().any(|r| r == "autonomous_retry_guard_ambiguous"));
    let reason_codes = second_intents[0]["reasonCodes"].as_array().expect("reasonCodes array").clone();
    assert!(reason_codes.iter().any(|r| r == "fleet_handoff_retry_guarded"));

    assert_eq!(
        std::fs::read_to_string(&marker).expect("marker after second pass").lines().count(),
        1,
        "retry-guarded intent must not dispatch a second control call"
    );
}
