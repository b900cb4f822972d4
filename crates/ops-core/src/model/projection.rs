// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ProjectedState` (spec §3, §4.1).

use serde::{Deserialize, Serialize};

use super::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    #[serde(rename = "currentState")]
    pub current_state: String,
    #[serde(rename = "triggeringSignal")]
    pub triggering_signal: String,
    pub confidence: Confidence,
}

/// Additive-within-a-pass divergence flags (spec §4.1 guarantee (c)).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivergenceFlags {
    #[serde(rename = "approvalCompletionConflict", default)]
    pub approval_completion_conflict: bool,
    #[serde(rename = "cursorRegression", default)]
    pub cursor_regression: bool,
    #[serde(rename = "stateLoopRunMismatch", default)]
    pub state_loop_run_mismatch: bool,
}

impl DivergenceFlags {
    pub fn any(&self) -> bool {
        self.approval_completion_conflict || self.cursor_regression || self.state_loop_run_mismatch
    }

    /// Union two flag sets: a conflict observed in either pass stays set.
    /// Used when merging flags computed in separate detection steps within
    /// one projection pass.
    pub fn union(self, other: DivergenceFlags) -> DivergenceFlags {
        DivergenceFlags {
            approval_completion_conflict: self.approval_completion_conflict
                || other.approval_completion_conflict,
            cursor_regression: self.cursor_regression || other.cursor_regression,
            state_loop_run_mismatch: self.state_loop_run_mismatch || other.state_loop_run_mismatch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Divergence {
    pub any: bool,
    pub flags: DivergenceFlags,
}

impl Divergence {
    pub fn from_flags(flags: DivergenceFlags) -> Self {
        Self {
            any: flags.any(),
            flags,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedState {
    pub projection: serde_json::Value,
    pub transition: Transition,
    pub divergence: Divergence,
    pub cursor: Cursor,
    #[serde(rename = "traceId")]
    pub trace_id: String,
}

#[cfg(test)]
#[path = "projection_tests.rs"]
mod tests;
