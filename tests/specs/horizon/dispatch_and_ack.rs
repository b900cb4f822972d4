//! S7: create a packet, orchestrate-dispatch it, then ingest an ack
//! receipt. A duplicate ingest of the same receipt must not double-count.

use crate::prelude::*;

#[test]
fn dispatch_then_ack_is_idempotent_on_replay() {
    let project = Project::empty();

    let created = project
        .ops_manager()
        .args([
            "horizon-packet",
            "create",
            "--horizon-ref",
            "horizon-1",
            "--sender",
            "loop-a",
            "--recipient-type",
            "human",
            "--recipient-id",
            "reviewer-1",
            "--intent",
            "review",
        ])
        .passes();
    let packet_id = created.json()["packetId"].as_str().expect("packetId").to_string();

    let dispatch = project.ops_manager().args(["horizon-orchestrate", "dispatch", "--adapter", "stdout"]).passes();
    let dispatched_ids: Vec<String> =
        dispatch.json()["dispatched"].as_array().expect("array").iter().map(|row| row["packetId"].as_str().expect("packetId").to_string()).collect();
    assert!(dispatched_ids.contains(&packet_id));

    let show = project.ops_manager().args(["horizon-packet", "show", &packet_id]).passes();
    assert_eq!(show.json()["status"], "dispatched");

    let first_ack = project
        .ops_manager()
        .args(["horizon-ack", "ingest", "--packet-id", &packet_id, "--trace-id", "trace-1", "--to", "acknowledged"])
        .passes();
    assert_eq!(first_ack.json()["status"], "processed");
    assert_eq!(first_ack.json()["duplicateCount"], 0);

    let replay_ack = project
        .ops_manager()
        .args(["horizon-ack", "ingest", "--packet-id", &packet_id, "--trace-id", "trace-1", "--to", "acknowledged"])
        .passes();
    assert_eq!(replay_ack.json()["status"], "duplicate");
    assert_eq!(replay_ack.json()["duplicateCount"], 1);

    let final_show = project.ops_manager().args(["horizon-packet", "show", &packet_id]).passes();
    assert_eq!(final_show.json()["status"], "acknowledged");
}
