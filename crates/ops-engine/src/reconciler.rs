// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-loop reconciler (spec §4.3): snapshot + events via transport,
//! project, evaluate health, persist cursor/sequence-state, and emit
//! telemetry/escalation rows.

use ops_core::clock::Clock;
use ops_core::config::ReconcilerConfig;
use ops_core::error::AppResult;
use ops_core::model::health::{Health, HealthStatus};
use ops_core::model::sequence::SequenceState;
use ops_core::model::snapshot::Cursor;
use ops_core::model::ProjectedState;
use ops_core::repo::Repo;
use ops_transport::Transport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::evaluator::{evaluate, EvaluatorInput};
use crate::projector::{project, ProjectorInput};

const MAX_EVENTS_PER_RECONCILE: u64 = 500;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    pub loop_id: String,
    pub succeeded: bool,
    pub health: Health,
    pub cursor: Cursor,
    pub trace_id: String,
    /// Populated when `succeeded` is false; feeds the fleet rollup (§4.5).
    pub reason_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReconcileTelemetryRow {
    status: String,
    health_status: HealthStatus,
    health_reason_codes: BTreeSet<ops_core::model::health::ReasonCode>,
    duration_seconds: f64,
    trace_id: String,
    timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EscalationRow {
    category: String,
    loop_id: String,
    health_status: HealthStatus,
    reason_codes: BTreeSet<ops_core::model::health::ReasonCode>,
    trace_id: String,
    timestamp: String,
}

pub struct Reconciler<C: Clock> {
    repo: Repo,
    clock: C,
}

impl<C: Clock> Reconciler<C> {
    pub fn new(repo: Repo, clock: C) -> Self {
        Self { repo, clock }
    }

    pub async fn reconcile(
        &self,
        transport: &dyn Transport,
        loop_id: &str,
        trace_id: &str,
        config: &ReconcilerConfig,
    ) -> AppResult<ReconcileOutcome> {
        let start = self.clock.epoch_ms();
        let prior_projected: Option<ProjectedState> =
            ops_storage::atomic_json::read_json(&self.repo.ops_loop_state_json(loop_id))?;
        let prior_health: Option<Health> =
            ops_storage::atomic_json::read_json(&self.repo.ops_loop_health_json(loop_id))?;
        let mut sequence_state: SequenceState =
            ops_storage::atomic_json::read_json(&self.repo.ops_loop_sequence_state_json(loop_id))?
                .unwrap_or_default();
        sequence_state.trace_id = trace_id.to_string();

        let cursor = prior_projected.as_ref().map(|p| p.cursor).unwrap_or_default();
        let failure_streak = self.transport_failure_streak(loop_id)?;

        let snapshot = match transport.snapshot(loop_id).await {
            Ok(snapshot) => snapshot,
            Err(_) => {
                return self
                    .record_transport_failure(
                        loop_id,
                        trace_id,
                        start,
                        cursor,
                        prior_projected.as_ref(),
                        &sequence_state,
                        config,
                        failure_streak + 1,
                    )
                    .await;
            }
        };

        let events = match transport
            .events(loop_id, cursor.event_line_offset, MAX_EVENTS_PER_RECONCILE)
            .await
        {
            Ok(page) if page.ok => page.events,
            _ => {
                return self
                    .record_transport_failure(
                        loop_id,
                        trace_id,
                        start,
                        cursor,
                        prior_projected.as_ref(),
                        &sequence_state,
                        config,
                        failure_streak + 1,
                    )
                    .await;
            }
        };

        let violations_before = sequence_state.violations.len();
        sequence_state.observe_snapshot(snapshot.cursor.event_line_offset);
        for event in &events {
            sequence_state.observe_event(event.sequence.value);
        }
        if sequence_state.violations.len() == violations_before {
            // No new regression this pass: a subsequent in-order
            // observation clears the active flag without forgetting the
            // violation history (spec §4.1 guarantee (c)).
            sequence_state.clear_drift();
        }

        let projected = project(ProjectorInput {
            snapshot: &snapshot,
            events: &events,
            prior: prior_projected.as_ref(),
            trace_id,
        })?;

        let last_event_at = parse_timestamp(&snapshot.runtime.last_event_at);
        let heartbeat_at = snapshot
            .runtime_heartbeat
            .as_ref()
            .and_then(|h| parse_timestamp(&h.last_beat_at));

        let health = evaluate(EvaluatorInput {
            projected: &projected,
            thresholds: config.threshold_profile.resolve(),
            now: self.clock.now_utc(),
            last_event_at,
            heartbeat_at,
            transport_failure_streak: 0,
            sequence_state: &sequence_state,
            control_ambiguous: false,
        });

        let cursor_advanced = prior_projected
            .as_ref()
            .map(|p| p.cursor != projected.cursor)
            .unwrap_or(true);
        let health_changed = prior_health.as_ref().map(|h| !h.materially_equal(&health)).unwrap_or(true);
        let first_reconcile = prior_projected.is_none();

        if cursor_advanced || health_changed || first_reconcile {
            ops_storage::atomic_json::write_json_atomic(
                &self.repo.ops_loop_state_json(loop_id),
                &projected,
            )?;
            ops_storage::atomic_json::write_json_atomic(
                &self.repo.ops_loop_health_json(loop_id),
                &health,
            )?;
            ops_storage::atomic_json::write_json_atomic(
                &self.repo.ops_loop_cursor_json(loop_id),
                &projected.cursor,
            )?;
            ops_storage::atomic_json::write_json_atomic(
                &self.repo.ops_loop_sequence_state_json(loop_id),
                &sequence_state,
            )?;

            let duration_seconds = (self.clock.epoch_ms().saturating_sub(start)) as f64 / 1000.0;
            ops_storage::jsonl::append_line(
                &self.repo.ops_loop_telemetry(loop_id, "reconcile"),
                &ReconcileTelemetryRow {
                    status: "succeeded".into(),
                    health_status: health.status,
                    health_reason_codes: health.reason_codes.clone(),
                    duration_seconds,
                    trace_id: trace_id.to_string(),
                    timestamp: self.clock.now_rfc3339(),
                },
            )?;

            self.append_escalations(loop_id, trace_id, &health)?;
        }

        Ok(ReconcileOutcome {
            loop_id: loop_id.to_string(),
            succeeded: true,
            health,
            cursor: projected.cursor,
            trace_id: trace_id.to_string(),
            reason_code: None,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn record_transport_failure(
        &self,
        loop_id: &str,
        trace_id: &str,
        start: u64,
        cursor: Cursor,
        prior_projected: Option<&ProjectedState>,
        sequence_state: &SequenceState,
        config: &ReconcilerConfig,
        failure_streak: u32,
    ) -> AppResult<ReconcileOutcome> {
        let placeholder = prior_projected.cloned().unwrap_or_else(|| ProjectedState {
            projection: serde_json::json!({}),
            transition: ops_core::model::projection::Transition {
                current_state: "unknown".into(),
                triggering_signal: "snapshot".into(),
                confidence: ops_core::model::projection::Confidence::Low,
            },
            divergence: ops_core::model::projection::Divergence::from_flags(
                ops_core::model::projection::DivergenceFlags::default(),
            ),
            cursor,
            trace_id: trace_id.to_string(),
        });

        let health = evaluate(EvaluatorInput {
            projected: &placeholder,
            thresholds: config.threshold_profile.resolve(),
            now: self.clock.now_utc(),
            last_event_at: None,
            heartbeat_at: None,
            transport_failure_streak: failure_streak,
            sequence_state,
            control_ambiguous: false,
        });

        ops_storage::atomic_json::write_json_atomic(&self.repo.ops_loop_health_json(loop_id), &health)?;

        let duration_seconds = (self.clock.epoch_ms().saturating_sub(start)) as f64 / 1000.0;
        ops_storage::jsonl::append_line(
            &self.repo.ops_loop_telemetry(loop_id, "reconcile"),
            &ReconcileTelemetryRow {
                status: "failed".into(),
                health_status: health.status,
                health_reason_codes: health.reason_codes.clone(),
                duration_seconds,
                trace_id: trace_id.to_string(),
                timestamp: self.clock.now_rfc3339(),
            },
        )?;
        self.append_escalations(loop_id, trace_id, &health)?;

        Ok(ReconcileOutcome {
            loop_id: loop_id.to_string(),
            succeeded: false,
            health,
            cursor,
            trace_id: trace_id.to_string(),
            reason_code: Some("transport_unreachable".to_string()),
        })
    }

    fn append_escalations(&self, loop_id: &str, trace_id: &str, health: &Health) -> AppResult<()> {
        let mut categories = Vec::new();
        match health.status {
            HealthStatus::Critical => categories.push("health_critical"),
            HealthStatus::Degraded => categories.push("health_degraded"),
            HealthStatus::Healthy => {}
        }
        if health
            .reason_codes
            .contains(&ops_core::model::health::ReasonCode::DivergenceDetected)
        {
            categories.push("divergence_detected");
        }

        for category in categories {
            ops_storage::jsonl::append_line(
                &self.repo.ops_loop_escalations_jsonl(loop_id),
                &EscalationRow {
                    category: category.to_string(),
                    loop_id: loop_id.to_string(),
                    health_status: health.status,
                    reason_codes: health.reason_codes.clone(),
                    trace_id: trace_id.to_string(),
                    timestamp: self.clock.now_rfc3339(),
                },
            )?;
        }
        Ok(())
    }

    /// Count of consecutive `status="failed"` rows at the tail of
    /// `reconcile.jsonl`, reset on the first subsequent success (spec
    /// §4.2). Derived from telemetry rather than a dedicated counter file,
    /// per Design Note 9's "telemetry as append-only JSONL" guidance.
    fn transport_failure_streak(&self, loop_id: &str) -> AppResult<u32> {
        let rows: Vec<(u64, ReconcileTelemetryRow)> =
            ops_storage::jsonl::read_since_typed(&self.repo.ops_loop_telemetry(loop_id, "reconcile"), 0)?;
        let mut streak = 0;
        for (_, row) in rows.iter().rev() {
            if row.status == "failed" {
                streak += 1;
            } else {
                break;
            }
        }
        Ok(streak)
    }
}

fn parse_timestamp(raw: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&chrono::Utc))
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
