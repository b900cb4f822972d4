// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The four promotion gate groups (spec §4.9): governance,
//! outcome_reliability, safety_suppression, drill_recency.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ops_core::clock::Clock;
use ops_core::config::PromotionConfig;
use ops_core::error::AppResult;
use ops_core::model::handoff::HandoffStatus;
use ops_core::model::registry::{AutonomousPolicy, FleetRegistry, PolicyMode};
use ops_core::repo::Repo;
use serde::{Deserialize, Serialize};

/// Drills this gate requires a recent `pass` for. Fixed set (spec §4.9
/// gate group 4).
pub const REQUIRED_DRILL_IDS: &[&str] = &["kill_switch", "sprite_service_outage", "ambiguous_retry_guard"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrillStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillRecord {
    pub drill_id: String,
    pub status: DrillStatus,
    pub completed_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillState {
    #[serde(default)]
    pub drills: Vec<DrillRecord>,
}

/// Narrow read-side view of `ops_policy::engine::PolicyState`; only the
/// two fields this crate's gates need.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyStateView {
    #[serde(default)]
    reason_codes: std::collections::BTreeSet<String>,
    #[serde(default)]
    summary: PolicySummaryView,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicySummaryView {
    #[serde(default)]
    by_autonomy_reason: BTreeMap<String, u32>,
}

/// Narrow read-side view of `ops_handoff::execute::HandoffTelemetryRow`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HandoffTelemetryRowView {
    status: HandoffStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateVerdict {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateResult {
    pub name: String,
    pub verdict: GateVerdict,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionDecision {
    Promote,
    Hold,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateReport {
    pub decision: PromotionDecision,
    pub gates: Vec<GateResult>,
}

fn governance_gate(registry: &FleetRegistry, config: &PromotionConfig, now: DateTime<Utc>) -> GateResult {
    let mut reasons = Vec::new();

    let autonomous: Option<&AutonomousPolicy> = registry.policy.autonomous.as_ref();
    if registry.mode() != PolicyMode::GuardedAuto {
        reasons.push("posture_blocks_autonomy".to_string());
    }
    match autonomous {
        None => reasons.push("autonomous_policy_not_configured".to_string()),
        Some(policy) => {
            if policy.safety.kill_switch {
                reasons.push("posture_blocks_autonomy".to_string());
            }
            if config.require_authority_context && policy.governance.authority_context.is_none() {
                reasons.push("authority_context_missing".to_string());
            }
            match DateTime::parse_from_rfc3339(&policy.governance.review_by) {
                Ok(review_by) if review_by.with_timezone(&Utc) < now => {
                    reasons.push("review_by_expired".to_string());
                }
                Err(_) => reasons.push("review_by_unparseable".to_string()),
                _ => {}
            }
        }
    }

    GateResult {
        name: "governance".to_string(),
        verdict: if reasons.is_empty() { GateVerdict::Pass } else { GateVerdict::Fail },
        reasons,
    }
}

fn outcome_reliability_gate(repo: &Repo, config: &PromotionConfig) -> AppResult<GateResult> {
    let all: Vec<(u64, HandoffTelemetryRowView)> =
        ops_storage::jsonl::read_since_typed(&repo.fleet_telemetry("handoff"), 0)?;
    let window: Vec<HandoffStatus> = all
        .into_iter()
        .rev()
        .take(config.outcome_reliability.lookback_executions as usize)
        .map(|(_, row)| row.status)
        .collect();

    let mut reasons = Vec::new();
    let attempted = window.len() as u32;
    if attempted < config.outcome_reliability.min_sample_size {
        reasons.push("outcome_sample_too_small".to_string());
    } else {
        let ambiguous = window.iter().filter(|s| **s == HandoffStatus::ExecutionAmbiguous).count() as f64;
        let failed = window.iter().filter(|s| **s == HandoffStatus::ExecutionFailed).count() as f64;
        let total = attempted as f64;
        if ambiguous / total > config.outcome_reliability.max_ambiguity_rate {
            reasons.push("outcome_ambiguity_rate_exceeded".to_string());
        }
        if failed / total > config.outcome_reliability.max_failure_rate {
            reasons.push("outcome_failure_rate_exceeded".to_string());
        }
    }

    Ok(GateResult {
        name: "outcome_reliability".to_string(),
        verdict: if reasons.is_empty() { GateVerdict::Pass } else { GateVerdict::Fail },
        reasons,
    })
}

/// The four suppression-path groupings read off `policy-state.json`'s
/// per-reason autonomy counts (`ops_policy::engine::PolicyState.summary`).
/// `transportGated` counts the retry guard's demotion reason;
/// `ops_policy::engine::run_policy_pass` applies that guard to candidates
/// itself (reading the same handoff telemetry stream `ops_handoff`'s own
/// guard reads) so the reason lands in this summary before
/// `policy-state.json` is persisted, not only on the downstream handoff
/// intent.
fn safety_suppression_gate(policy_state: &PolicyStateView) -> GateResult {
    let by_reason = &policy_state.summary.by_autonomy_reason;
    let sum = |reasons: &[&str]| -> u32 { reasons.iter().filter_map(|r| by_reason.get(*r)).sum() };

    let policy_gated = sum(&[
        "autonomous_max_actions_per_run_exceeded",
        "autonomous_max_actions_per_loop_exceeded",
        "autonomous_cooldown_active",
        "category_not_allowlisted",
        "intent_not_allowlisted",
        "autonomous_below_min_severity",
        "autonomous_below_min_confidence",
    ]);
    let rollout_gated = sum(&[
        "autonomous_rollout_scope_excluded",
        "autonomous_rollout_canary_excluded",
        "autonomous_rollout_paused_manual",
        "autonomous_rollout_paused_auto",
    ]);
    let governance_gated = sum(&[
        "autonomous_mode_not_guarded",
        "autonomous_policy_not_configured",
        "autonomous_kill_switch_enabled",
    ]);
    let transport_gated = sum(&["autonomous_retry_guard_ambiguous"]);

    let autopause_active = by_reason.contains_key("autonomous_autopause_failure_spike")
        || by_reason.contains_key("autonomous_autopause_ambiguous_spike");

    let mut reasons = Vec::new();
    if autopause_active {
        reasons.push("autopause_active".to_string());
    }
    if policy_gated == 0 {
        reasons.push("policy_gated_path_unverified".to_string());
    }
    if rollout_gated == 0 {
        reasons.push("rollout_gated_path_unverified".to_string());
    }
    if governance_gated == 0 {
        reasons.push("governance_gated_path_unverified".to_string());
    }
    if transport_gated == 0 {
        reasons.push("transport_gated_path_unverified".to_string());
    }
    let _ = &policy_state.reason_codes;

    GateResult {
        name: "safety_suppression".to_string(),
        verdict: if reasons.is_empty() { GateVerdict::Pass } else { GateVerdict::Fail },
        reasons,
    }
}

fn drill_recency_gate(drills: &DrillState, config: &PromotionConfig, now: DateTime<Utc>) -> GateResult {
    let mut reasons = Vec::new();
    for drill_id in REQUIRED_DRILL_IDS {
        let record = drills.drills.iter().find(|d| d.drill_id == *drill_id);
        match record {
            None => reasons.push(format!("drill_missing_{drill_id}")),
            Some(record) => {
                if record.status != DrillStatus::Pass {
                    reasons.push(format!("drill_not_passing_{drill_id}"));
                    continue;
                }
                match DateTime::parse_from_rfc3339(&record.completed_at) {
                    Ok(completed_at) => {
                        let age_hours = (now - completed_at.with_timezone(&Utc)).num_hours();
                        if age_hours < 0 || age_hours as u64 > config.max_drill_age_hours {
                            reasons.push(format!("drill_stale_{drill_id}"));
                        }
                    }
                    Err(_) => reasons.push(format!("drill_completed_at_unparseable_{drill_id}")),
                }
            }
        }
    }

    GateResult {
        name: "drill_recency".to_string(),
        verdict: if reasons.is_empty() { GateVerdict::Pass } else { GateVerdict::Fail },
        reasons,
    }
}

/// Evaluate all four gate groups and persist nothing; the caller
/// (`orchestrator::run`) owns writing `promotion-state.json`.
pub fn evaluate_gates<C: Clock>(repo: &Repo, clock: &C, registry: &FleetRegistry, config: &PromotionConfig) -> AppResult<GateReport> {
    let now = clock.now_utc();
    let policy_state: PolicyStateView = ops_storage::atomic_json::read_json(&repo.fleet_policy_state_json())?.unwrap_or_default();
    let drill_state: DrillState = ops_storage::atomic_json::read_json(&repo.fleet_drill_state_json())?.unwrap_or_default();

    let gates = vec![
        governance_gate(registry, config, now),
        outcome_reliability_gate(repo, config)?,
        safety_suppression_gate(&policy_state),
        drill_recency_gate(&drill_state, config, now),
    ];

    let decision = if gates.iter().all(|g| g.verdict == GateVerdict::Pass) {
        PromotionDecision::Promote
    } else {
        PromotionDecision::Hold
    };

    Ok(GateReport { decision, gates })
}

#[cfg(test)]
#[path = "gates_tests.rs"]
mod tests;
