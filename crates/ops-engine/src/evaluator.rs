// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Health evaluator (spec §4.2): a pure function of projected state,
//! transport failure history, heartbeat staleness, and sequence drift.
//! Never raises a reason code outside the closed [`ReasonCode`] set.

use chrono::{DateTime, Utc};
use ops_core::model::health::{Health, HealthStatus, ReasonCode, Thresholds};
use ops_core::model::sequence::SequenceState;
use ops_core::model::ProjectedState;

pub struct EvaluatorInput<'a> {
    pub projected: &'a ProjectedState,
    pub thresholds: Thresholds,
    pub now: DateTime<Utc>,
    pub last_event_at: Option<DateTime<Utc>>,
    pub heartbeat_at: Option<DateTime<Utc>>,
    pub transport_failure_streak: u32,
    pub sequence_state: &'a SequenceState,
    /// Set when the most recent autonomous control call for this loop
    /// resolved `control_ambiguous` and has not yet been superseded by an
    /// operator-confirmed outcome.
    pub control_ambiguous: bool,
}

pub fn evaluate(input: EvaluatorInput<'_>) -> Health {
    let mut reason_codes = std::collections::BTreeSet::new();

    if let Some(last_event_at) = input.last_event_at {
        let lag = lag_seconds(input.now, last_event_at);
        if lag > input.thresholds.ingest_stale_seconds {
            reason_codes.insert(ReasonCode::IngestStale);
        }
    }

    if let Some(heartbeat_at) = input.heartbeat_at {
        let lag = lag_seconds(input.now, heartbeat_at);
        if lag > input.thresholds.heartbeat_stale_seconds {
            reason_codes.insert(ReasonCode::RuntimeHeartbeatStale);
        }
    }

    if input.transport_failure_streak >= input.thresholds.degraded_transport_failure_streak {
        reason_codes.insert(ReasonCode::TransportUnreachable);
    }

    if input.sequence_state.drift_active {
        reason_codes.insert(ReasonCode::OrderingDriftDetected);
    }

    if input.control_ambiguous {
        reason_codes.insert(ReasonCode::ControlAmbiguous);
    }

    if input.projected.divergence.flags.approval_completion_conflict {
        reason_codes.insert(ReasonCode::ApprovalCompletionConflict);
    }

    if input.projected.divergence.any {
        reason_codes.insert(ReasonCode::DivergenceDetected);
    }

    let status = reason_codes
        .iter()
        .fold(HealthStatus::Healthy, |acc, code| acc.worst(code.minimum_status()));

    // The critical transport-failure streak forces critical regardless of
    // what the generic reason-code floor above computed.
    let status = if input.transport_failure_streak >= input.thresholds.critical_transport_failure_streak
    {
        status.worst(HealthStatus::Critical)
    } else {
        status
    };

    Health {
        status,
        reason_codes,
        thresholds: input.thresholds,
        trace_id: input.projected.trace_id.clone(),
    }
}

fn lag_seconds(now: DateTime<Utc>, then: DateTime<Utc>) -> u64 {
    (now - then).num_seconds().max(0) as u64
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
