// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single `Repo` handle owning every path named in the file layout
//! (spec §6), so no subsystem reconstructs a path from a string
//! (Design Note 9: "many scripts sharing a repo root").

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Repo {
    root: PathBuf,
}

impl Repo {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn superloop(&self) -> PathBuf {
        self.root.join(".superloop")
    }

    // ---- Runtime artifacts (external collaborator: the superloop itself) ----

    pub fn runtime_state_json(&self) -> PathBuf {
        self.superloop().join("state.json")
    }

    pub fn runtime_active_run_json(&self) -> PathBuf {
        self.superloop().join("active-run.json")
    }

    pub fn loop_dir(&self, loop_id: &str) -> PathBuf {
        self.superloop().join("loops").join(loop_id)
    }

    pub fn loop_run_summary_json(&self, loop_id: &str) -> PathBuf {
        self.loop_dir(loop_id).join("run-summary.json")
    }

    pub fn loop_events_jsonl(&self, loop_id: &str) -> PathBuf {
        self.loop_dir(loop_id).join("events.jsonl")
    }

    pub fn loop_heartbeat_json(&self, loop_id: &str) -> PathBuf {
        self.loop_dir(loop_id).join("heartbeat.v1.json")
    }

    // ---- ops-manager/<loopId>/ ----

    fn ops_manager(&self) -> PathBuf {
        self.superloop().join("ops-manager")
    }

    pub fn ops_loop_dir(&self, loop_id: &str) -> PathBuf {
        self.ops_manager().join(loop_id)
    }

    pub fn ops_loop_state_json(&self, loop_id: &str) -> PathBuf {
        self.ops_loop_dir(loop_id).join("state.json")
    }

    pub fn ops_loop_health_json(&self, loop_id: &str) -> PathBuf {
        self.ops_loop_dir(loop_id).join("health.json")
    }

    pub fn ops_loop_cursor_json(&self, loop_id: &str) -> PathBuf {
        self.ops_loop_dir(loop_id).join("cursor.json")
    }

    pub fn ops_loop_heartbeat_json(&self, loop_id: &str) -> PathBuf {
        self.ops_loop_dir(loop_id).join("heartbeat.json")
    }

    pub fn ops_loop_sequence_state_json(&self, loop_id: &str) -> PathBuf {
        self.ops_loop_dir(loop_id).join("sequence-state.json")
    }

    pub fn ops_loop_intents_jsonl(&self, loop_id: &str) -> PathBuf {
        self.ops_loop_dir(loop_id).join("intents.jsonl")
    }

    pub fn ops_loop_escalations_jsonl(&self, loop_id: &str) -> PathBuf {
        self.ops_loop_dir(loop_id).join("escalations.jsonl")
    }

    pub fn ops_loop_alert_dispatch_state_json(&self, loop_id: &str) -> PathBuf {
        self.ops_loop_dir(loop_id).join("alert-dispatch-state.json")
    }

    pub fn ops_loop_service_idempotency_json(&self, loop_id: &str) -> PathBuf {
        self.ops_loop_dir(loop_id).join("service-idempotency.json")
    }

    fn ops_loop_telemetry_dir(&self, loop_id: &str) -> PathBuf {
        self.ops_loop_dir(loop_id).join("telemetry")
    }

    pub fn ops_loop_telemetry(&self, loop_id: &str, stream: &str) -> PathBuf {
        self.ops_loop_telemetry_dir(loop_id).join(format!("{stream}.jsonl"))
    }

    // ---- ops-manager/fleet/ ----

    pub fn fleet_dir(&self) -> PathBuf {
        self.ops_manager().join("fleet")
    }

    pub fn fleet_registry_json(&self) -> PathBuf {
        self.fleet_dir().join("registry.v1.json")
    }

    pub fn fleet_state_json(&self) -> PathBuf {
        self.fleet_dir().join("state.json")
    }

    pub fn fleet_policy_state_json(&self) -> PathBuf {
        self.fleet_dir().join("policy-state.json")
    }

    pub fn fleet_handoff_state_json(&self) -> PathBuf {
        self.fleet_dir().join("handoff-state.json")
    }

    pub fn fleet_promotion_state_json(&self) -> PathBuf {
        self.fleet_dir().join("promotion-state.json")
    }

    pub fn fleet_promotion_apply_state_json(&self) -> PathBuf {
        self.fleet_dir().join("promotion-apply-state.json")
    }

    /// Operator-recorded drill results the promotion `drill_recency` gate
    /// reads; written outside this workspace by whatever runs the drills.
    pub fn fleet_drill_state_json(&self) -> PathBuf {
        self.fleet_dir().join("drill-state.json")
    }

    pub fn fleet_horizon_bridge_queue_json(&self) -> PathBuf {
        self.fleet_dir().join("horizon-bridge-queue.json")
    }

    pub fn fleet_horizon_bridge_state_json(&self) -> PathBuf {
        self.fleet_dir().join("horizon-bridge-state.json")
    }

    pub fn fleet_horizon_bridge_claims_dir(&self, outcome: &str) -> PathBuf {
        self.fleet_dir().join("horizon-bridge-claims").join(outcome)
    }

    fn fleet_telemetry_dir(&self) -> PathBuf {
        self.fleet_dir().join("telemetry")
    }

    pub fn fleet_telemetry(&self, stream: &str) -> PathBuf {
        self.fleet_telemetry_dir().join(format!("{stream}.jsonl"))
    }

    // ---- horizons/ ----

    pub fn horizons_dir(&self) -> PathBuf {
        self.root.join("horizons")
    }

    pub fn horizon_packet_json(&self, packet_id: &str) -> PathBuf {
        self.horizons_dir().join("packets").join(format!("{packet_id}.json"))
    }

    pub fn horizon_packets_dir(&self) -> PathBuf {
        self.horizons_dir().join("packets")
    }

    pub fn horizon_outbox_jsonl(&self, recipient_type: &str, recipient_id: &str) -> PathBuf {
        self.horizons_dir()
            .join("outbox")
            .join(recipient_type)
            .join(format!("{recipient_id}.jsonl"))
    }

    pub fn horizon_telemetry(&self, stream: &str) -> PathBuf {
        self.horizons_dir().join("telemetry").join(format!("{stream}.jsonl"))
    }

    pub fn horizon_retry_state_json(&self) -> PathBuf {
        self.horizons_dir().join("retry-state.json")
    }

    pub fn horizon_ack_state_json(&self) -> PathBuf {
        self.horizons_dir().join("ack-state.json")
    }

    /// Known-recipient directory the orchestrate/plan pass consults when
    /// `directoryMode=required` (spec §4.10).
    pub fn horizon_directory_json(&self) -> PathBuf {
        self.horizons_dir().join("directory.json")
    }

    /// Drop-in root external producers deposit bridge envelopes into; the
    /// horizon→handoff bridge claims files out of here by rename (spec
    /// §4.11).
    pub fn horizon_bridge_inbox_dir(&self) -> PathBuf {
        self.horizons_dir().join("bridge-inbox")
    }

    /// Create every directory a write to `path` will need. Defensive per
    /// Design Note 9 ("directories are created defensively").
    pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "repo_tests.rs"]
mod tests;
