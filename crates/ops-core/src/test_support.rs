// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test builders shared across crates, gated behind `test-support` (or
//! always on under `cfg(test)`), mirroring `oj_core::test_support`.

use crate::model::*;

pub fn snapshot_fixture(loop_id: &str, trace_id: &str, offset: u64) -> LoopRunSnapshot {
    LoopRunSnapshot {
        schema_version: SchemaVersion::V1,
        envelope_type: "loop_run_snapshot".into(),
        trace_id: trace_id.into(),
        source: snapshot::SnapshotSource {
            repo: "/repo".into(),
            loop_id: loop_id.into(),
        },
        runtime: snapshot::RuntimeProjection {
            status: LoopStatus::Running,
            last_event_at: "2026-01-01T00:00:00Z".into(),
            iteration: 1,
            run_id: "run-1".into(),
            loop_id: loop_id.into(),
        },
        gate_summary: Default::default(),
        stuck_streak: 0,
        cursor: Cursor::new(offset),
        runtime_heartbeat: Some(snapshot::RuntimeHeartbeat {
            last_beat_at: "2026-01-01T00:00:00Z".into(),
        }),
        state_current_loop_id: Some(loop_id.into()),
    }
}

pub fn registry_fixture(fleet_id: &str, loop_ids: &[&str]) -> FleetRegistry {
    FleetRegistry {
        fleet_id: fleet_id.into(),
        loops: loop_ids
            .iter()
            .map(|id| registry::LoopEntry {
                loop_id: (*id).into(),
                transport: registry::TransportKind::Local,
                service: None,
                enabled: true,
            })
            .collect(),
        policy: registry::PolicyConfig {
            mode: registry::PolicyModeOrDefault::Advisory,
            suppressions: Default::default(),
            noise_controls: registry::NoiseControls {
                dedupe_window_seconds: 300,
            },
            autonomous: None,
        },
    }
}
