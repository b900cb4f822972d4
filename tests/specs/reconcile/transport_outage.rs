//! S3: a loop whose run-summary artifact never appears on disk fails
//! transport twice in a row, crossing the degraded-transport-streak
//! threshold and forcing `critical` with `transport_unreachable` even
//! though no other signal fired.

use crate::prelude::*;
use ops_core::test_support::registry_fixture;

#[test]
fn two_consecutive_transport_failures_force_critical() {
    let project = Project::empty();
    project.write_json(project.repo().fleet_registry_json(), &registry_fixture("fleet-a", &["loop-a"]));
    // loop-a deliberately has no run-summary on disk for either call.

    let first = project.ops_manager().args(["reconcile", "loop-a"]).passes();
    assert_eq!(first.json()["succeeded"], false);
    assert_eq!(first.json()["reasonCode"], "transport_unreachable");
    assert_eq!(first.json()["health"]["status"], "healthy");

    let second = project.ops_manager().args(["reconcile", "loop-a"]).passes();
    assert_eq!(second.json()["succeeded"], false);
    assert_eq!(second.json()["health"]["status"], "critical");
    let reason_codes = second.json()["health"]["reasonCodes"].as_array().expect("reasonCodes array").clone();
    assert!(reason_codes.iter().any(|code| code == "transport_unreachable"));
}
