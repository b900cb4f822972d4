//! Sending the same control intent twice with the same idempotency key
//! dispatches the actuator once and replays the stored outcome the second
//! time.

use crate::prelude::*;
use ops_core::test_support::registry_fixture;
use std::io::Write;

fn actuator_script(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("actuator.sh");
    let mut file = std::fs::File::create(&path).expect("create actuator script");
    writeln!(file, "#!/bin/sh\ncat >/dev/null\necho confirmed").expect("write actuator script");
    drop(file);
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod actuator script");
    }
    path
}

#[test]
fn second_call_with_same_key_replays() {
    let project = Project::empty();
    project.write_json(project.repo().fleet_registry_json(), &registry_fixture("fleet-a", &["loop-a"]));
    let script = actuator_script(project.path());

    let first = project
        .ops_manager()
        .env("OPS_MANAGER_CONTROL_SCRIPT", &script)
        .args(["control", "loop-a", "--intent", "pause", "--idempotency-key", "key-1"])
        .passes();
    assert_eq!(first.json()["reasonCode"], "control_confirmed");
    assert_eq!(first.json()["replayed"], false);

    let second = project
        .ops_manager()
        .env("OPS_MANAGER_CONTROL_SCRIPT", &script)
        .args(["control", "loop-a", "--intent", "pause", "--idempotency-key", "key-1"])
        .passes();
    assert_eq!(second.json()["replayed"], true);
}
