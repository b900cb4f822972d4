// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/outcome shapes for `Transport::control`, and the closed set of
//! reason codes a transport call itself may resolve to (spec §4.7).

use serde::{Deserialize, Serialize};

/// A transport-level control call resolved without error: the actuator ran
/// and confirmed the intent.
pub const CONTROL_CONFIRMED: &str = "control_confirmed";
/// The actuator ran but its outcome could not be determined (e.g. it
/// timed out after partially applying the intent).
pub const CONTROL_AMBIGUOUS: &str = "control_ambiguous";
/// The actuator ran and reported failure.
pub const CONTROL_FAILED_COMMAND: &str = "control_failed_command";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlRequest {
    pub loop_id: String,
    pub intent: String,
    pub idempotency_key: String,
    pub trace_id: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlOutcome {
    /// One of [`CONTROL_CONFIRMED`], [`CONTROL_AMBIGUOUS`],
    /// [`CONTROL_FAILED_COMMAND`].
    pub reason_code: String,
    pub replayed: bool,
    pub trace_id: String,
}

impl ControlOutcome {
    pub fn confirmed(trace_id: impl Into<String>) -> Self {
        Self {
            reason_code: CONTROL_CONFIRMED.into(),
            replayed: false,
            trace_id: trace_id.into(),
        }
    }

    pub fn ambiguous(trace_id: impl Into<String>) -> Self {
        Self {
            reason_code: CONTROL_AMBIGUOUS.into(),
            replayed: false,
            trace_id: trace_id.into(),
        }
    }

    pub fn failed_command(trace_id: impl Into<String>) -> Self {
        Self {
            reason_code: CONTROL_FAILED_COMMAND.into(),
            replayed: false,
            trace_id: trace_id.into(),
        }
    }

    pub fn replayed_from(mut self) -> Self {
        self.replayed = true;
        self
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
