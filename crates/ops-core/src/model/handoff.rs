// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `HandoffIntent` (spec §3, §4.7).

use serde::{Deserialize, Serialize};

use super::policy::AutonomyClassification;
use super::registry::TransportKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoffStatus {
    PendingOperatorConfirmation,
    Executed,
    ExecutionAmbiguous,
    ExecutionFailed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoffIntent {
    #[serde(rename = "intentId")]
    pub intent_id: String,
    #[serde(rename = "loopId")]
    pub loop_id: String,
    pub category: String,
    pub intent: String,
    pub status: HandoffStatus,
    pub autonomous: AutonomyClassification,
    #[serde(rename = "idempotencyKey")]
    pub idempotency_key: String,
    pub transport: TransportKind,
    #[serde(rename = "reasonCodes", default)]
    pub reason_codes: Vec<String>,
}

impl HandoffIntent {
    pub fn make_id(candidate_id: &str, intent: &str) -> String {
        format!("{candidate_id}:{intent}")
    }
}

#[cfg(test)]
#[path = "handoff_tests.rs"]
mod tests;
