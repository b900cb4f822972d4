// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `LoopRunSnapshot`, `LoopRunEvent`, and `Cursor` (spec §3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopStatus {
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

/// Persistent `{eventLineOffset}` cursor. Owned by the reconciler; only
/// advanced when the projector has consumed that offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
    #[serde(rename = "eventLineOffset")]
    pub event_line_offset: u64,
}

impl Cursor {
    pub fn new(event_line_offset: u64) -> Self {
        Self { event_line_offset }
    }

    /// Invariant (spec §3, §8 Testable Property 2): the new cursor must
    /// never regress relative to `self`.
    pub fn has_regressed(&self, new: &Cursor) -> bool {
        new.event_line_offset < self.event_line_offset
    }
}

/// Gate summary carried on the snapshot, mirroring the superloop's planner
/// gate state (an external collaborator concept; only its shape is needed
/// here).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GateSummary {
    #[serde(default)]
    pub approval: Option<String>,
    #[serde(rename = "completionOk", default)]
    pub completion_ok: Option<bool>,
}

/// `envelopeType = "loop_run_snapshot"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopRunSnapshot {
    #[serde(rename = "schemaVersion")]
    pub schema_version: super::SchemaVersion,
    #[serde(rename = "envelopeType")]
    pub envelope_type: String,
    #[serde(rename = "traceId")]
    pub trace_id: String,
    pub source: SnapshotSource,
    pub runtime: RuntimeProjection,
    #[serde(rename = "gateSummary", default)]
    pub gate_summary: GateSummary,
    #[serde(rename = "stuckStreak", default)]
    pub stuck_streak: u32,
    pub cursor: Cursor,
    #[serde(rename = "runtimeHeartbeat", default)]
    pub runtime_heartbeat: Option<RuntimeHeartbeat>,
    /// `state.json.current_loop_id` as seen by the runtime state file,
    /// compared against `runtime.loop_id` to detect `stateLoopRunMismatch`.
    #[serde(rename = "stateCurrentLoopId", default)]
    pub state_current_loop_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSource {
    pub repo: String,
    #[serde(rename = "loopId")]
    pub loop_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeProjection {
    pub status: LoopStatus,
    #[serde(rename = "lastEventAt")]
    pub last_event_at: String,
    pub iteration: u64,
    #[serde(rename = "runId")]
    pub run_id: String,
    #[serde(rename = "loopId")]
    pub loop_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeHeartbeat {
    #[serde(rename = "lastBeatAt")]
    pub last_beat_at: String,
}

/// `envelopeType = "loop_run_event"`. Bound to (loopId, runId, iteration).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopRunEvent {
    #[serde(rename = "schemaVersion")]
    pub schema_version: super::SchemaVersion,
    #[serde(rename = "envelopeType")]
    pub envelope_type: String,
    #[serde(rename = "traceId")]
    pub trace_id: String,
    #[serde(rename = "loopId")]
    pub loop_id: String,
    #[serde(rename = "runId")]
    pub run_id: String,
    pub iteration: u64,
    pub sequence: super::Sequence,
    pub name: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub timestamp: String,
}

impl LoopRunEvent {
    pub fn line_offset(&self) -> u64 {
        self.sequence.value
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
