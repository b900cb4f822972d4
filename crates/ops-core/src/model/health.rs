// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Health` and the closed reason-code set (spec §3, §4.2).
//!
//! Extension procedure for the closed set (Open Question, spec §9): adding
//! a runtime signal requires a new [`ReasonCode`] variant. Because the enum
//! is matched exhaustively everywhere it is consumed (evaluator, CLI
//! renderer, alert severity table), the compiler forces every consumer to
//! account for it — that exhaustive match *is* the extension procedure,
//! there is no separate registry file to keep in sync.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Critical,
}

impl HealthStatus {
    /// Precedence: critical > degraded > healthy — the worst level across
    /// any reason wins.
    pub fn worst(self, other: HealthStatus) -> HealthStatus {
        self.max(other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    IngestStale,
    RuntimeHeartbeatStale,
    TransportUnreachable,
    OrderingDriftDetected,
    ControlAmbiguous,
    ApprovalCompletionConflict,
    DivergenceDetected,
}

impl ReasonCode {
    /// The health status this reason code forces at minimum. Explicit
    /// flags override the threshold-profile-derived status (spec §4.2).
    pub fn minimum_status(self) -> HealthStatus {
        match self {
            ReasonCode::TransportUnreachable => HealthStatus::Critical,
            ReasonCode::IngestStale
            | ReasonCode::RuntimeHeartbeatStale
            | ReasonCode::OrderingDriftDetected
            | ReasonCode::ControlAmbiguous
            | ReasonCode::ApprovalCompletionConflict
            | ReasonCode::DivergenceDetected => HealthStatus::Degraded,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdProfile {
    Strict,
    Balanced,
    Relaxed,
}

/// Concrete lag-seconds and transport-failure streaks a [`ThresholdProfile`]
/// resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(rename = "ingestStaleSeconds")]
    pub ingest_stale_seconds: u64,
    #[serde(rename = "heartbeatStaleSeconds")]
    pub heartbeat_stale_seconds: u64,
    #[serde(rename = "degradedTransportFailureStreak")]
    pub degraded_transport_failure_streak: u32,
    #[serde(rename = "criticalTransportFailureStreak")]
    pub critical_transport_failure_streak: u32,
}

impl ThresholdProfile {
    pub fn resolve(self) -> Thresholds {
        match self {
            ThresholdProfile::Strict => Thresholds {
                ingest_stale_seconds: 30,
                heartbeat_stale_seconds: 30,
                degraded_transport_failure_streak: 1,
                critical_transport_failure_streak: 2,
            },
            ThresholdProfile::Balanced => Thresholds {
                ingest_stale_seconds: 120,
                heartbeat_stale_seconds: 120,
                degraded_transport_failure_streak: 2,
                critical_transport_failure_streak: 4,
            },
            ThresholdProfile::Relaxed => Thresholds {
                ingest_stale_seconds: 600,
                heartbeat_stale_seconds: 600,
                degraded_transport_failure_streak: 4,
                critical_transport_failure_streak: 8,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: HealthStatus,
    #[serde(rename = "reasonCodes")]
    pub reason_codes: BTreeSet<ReasonCode>,
    pub thresholds: Thresholds,
    #[serde(rename = "traceId")]
    pub trace_id: String,
}

impl Health {
    pub fn healthy(thresholds: Thresholds, trace_id: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            reason_codes: BTreeSet::new(),
            thresholds,
            trace_id: trace_id.into(),
        }
    }

    /// Equality on everything but `trace_id` — a fresh trace ID is minted
    /// on every reconcile call that omits `--trace-id`, so callers that
    /// decide whether health materially changed must not diff on it.
    pub fn materially_equal(&self, other: &Health) -> bool {
        self.status == other.status && self.reason_codes == other.reason_codes && self.thresholds == other.thresholds
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
