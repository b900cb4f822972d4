// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `SequenceState` (spec §3): per-(repo, loopId) monotonicity tracking for
//! snapshot and event sequence numbers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const VIOLATION_SNAPSHOT_SEQUENCE_REGRESSION: &str = "snapshot_sequence_regression";
pub const VIOLATION_EVENT_SEQUENCE_REGRESSION: &str = "event_sequence_regression";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceState {
    #[serde(rename = "lastSnapshotSequence", default)]
    pub last_snapshot_sequence: u64,
    #[serde(rename = "lastEventSequence", default)]
    pub last_event_sequence: u64,
    #[serde(default)]
    pub violations: BTreeSet<String>,
    #[serde(rename = "driftActive", default)]
    pub drift_active: bool,
    #[serde(rename = "traceId", default)]
    pub trace_id: String,
}

impl SequenceState {
    /// Observe a new snapshot sequence number, recording a regression
    /// violation (but never discarding data) when it moves backwards.
    pub fn observe_snapshot(&mut self, value: u64) {
        if value < self.last_snapshot_sequence {
            self.violations.insert(VIOLATION_SNAPSHOT_SEQUENCE_REGRESSION.to_string());
            self.drift_active = true;
        } else {
            self.last_snapshot_sequence = value;
        }
    }

    /// Observe a new event sequence number.
    pub fn observe_event(&mut self, value: u64) {
        if value < self.last_event_sequence {
            self.violations.insert(VIOLATION_EVENT_SEQUENCE_REGRESSION.to_string());
            self.drift_active = true;
        } else {
            self.last_event_sequence = value;
        }
    }

    /// Clear drift once a subsequent in-order observation is made; the
    /// violation history is kept (it feeds `ordering_drift_detected`'s
    /// audit trail) but `driftActive` no longer gates health.
    pub fn clear_drift(&mut self) {
        self.drift_active = false;
    }
}

#[cfg(test)]
#[path = "sequence_tests.rs"]
mod tests;
