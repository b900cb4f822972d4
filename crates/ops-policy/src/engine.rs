// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrates the full policy pipeline (spec §4.6) and writes
//! `fleet/policy-state.json`.

use ops_core::clock::Clock;
use ops_core::error::AppResult;
use ops_core::model::policy::PolicyCandidate;
use ops_core::model::registry::{FleetRegistry, PolicyMode};
use ops_core::repo::Repo;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::autonomy::{compute_autopause, AutonomyGate, HandoffOutcome};
use crate::candidates::{self, LoopOutcome};
use crate::cooldown;
use crate::governance;
use crate::suppression;

/// Reason code drawn from the fixed set named in spec §4.6 step 6; used for
/// both `PolicyState.reasonCodes` and `AutonomyClassification.reasons`
/// entries that surface at the summary level.
pub const FLEET_ACTION_REQUIRED: &str = "fleet_action_required";
pub const FLEET_ACTIONS_SUPPRESSED: &str = "fleet_actions_suppressed";
pub const FLEET_ACTIONS_DEDUPED: &str = "fleet_actions_deduped";
pub const FLEET_AUTO_CANDIDATES_ELIGIBLE: &str = "fleet_auto_candidates_eligible";
pub const FLEET_AUTO_CANDIDATES_SAFETY_BLOCKED: &str = "fleet_auto_candidates_safety_blocked";
pub const FLEET_AUTO_CANDIDATES_ROLLOUT_GATED: &str = "fleet_auto_candidates_rollout_gated";
pub const FLEET_AUTO_CANDIDATES_PAUSED: &str = "fleet_auto_candidates_paused";
pub const FLEET_AUTO_CANDIDATES_AUTOPAUSE_TRIGGERED: &str = "fleet_auto_candidates_autopause_triggered";
pub const FLEET_AUTO_KILL_SWITCH_ENABLED: &str = "fleet_auto_kill_switch_enabled";

const AUTONOMOUS_MODE_NOT_GUARDED: &str = "autonomous_mode_not_guarded";
const AUTONOMOUS_POLICY_NOT_CONFIGURED: &str = "autonomous_policy_not_configured";
const AUTONOMOUS_RETRY_GUARD_AMBIGUOUS: &str = "autonomous_retry_guard_ambiguous";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyCounts {
    pub candidate_count: usize,
    pub unsuppressed_count: usize,
    pub suppressed_count: usize,
    pub auto_eligible_count: usize,
    pub manual_only_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySummary {
    pub by_autonomy_reason: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyState {
    pub candidates: Vec<PolicyCandidate>,
    pub counts: PolicyCounts,
    pub summary: PolicySummary,
    pub reason_codes: BTreeSet<String>,
    pub trace_id: String,
}

/// Telemetry row shape `ops-handoff` appends to `fleet/telemetry/handoff.jsonl`.
/// `loop_id`/`category`/`intent` are only needed to rebuild the retry-guard
/// key; autopause sampling uses `status` alone.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HandoffTelemetryRow {
    loop_id: String,
    category: String,
    intent: String,
    status: ops_core::model::HandoffStatus,
}

fn read_recent_handoff_outcomes(repo: &Repo) -> AppResult<Vec<HandoffOutcome>> {
    let rows: Vec<(u64, HandoffTelemetryRow)> = ops_storage::jsonl::read_since_typed(&repo.fleet_telemetry("handoff"), 0)?;
    Ok(rows.into_iter().map(|(_, row)| HandoffOutcome { status: row.status }).collect())
}

/// Most recent status per `(loopId, category, intent)` key, last-write-wins
/// over `fleet/telemetry/handoff.jsonl` — mirrors `ops_handoff::execute::
/// read_last_status`'s key shape so a candidate and the handoff intent it
/// becomes always agree on whether the retry guard applies.
fn read_last_status_by_key(repo: &Repo) -> AppResult<BTreeMap<String, ops_core::model::HandoffStatus>> {
    let rows: Vec<(u64, HandoffTelemetryRow)> = ops_storage::jsonl::read_since_typed(&repo.fleet_telemetry("handoff"), 0)?;
    let mut out = BTreeMap::new();
    for (_, row) in rows {
        out.insert(format!("{}:{}:{}", row.loop_id, row.category, row.intent), row.status);
    }
    Ok(out)
}

/// Demote any gate-eligible candidate whose retry-guard key last ended
/// `execution_ambiguous`, in place, and record the reason on the candidate
/// itself so it is counted in `PolicyState.summary.byAutonomyReason` —
/// the retry guard is an autonomy disqualifier like any other and belongs
/// in the same summary the safety-suppression promotion gate reads.
fn apply_retry_guard(candidates: &mut [PolicyCandidate], last_status: &BTreeMap<String, ops_core::model::HandoffStatus>) {
    for candidate in candidates.iter_mut() {
        if candidate.suppressed {
            continue;
        }
        let key = format!("{}:{}:{}", candidate.loop_id, candidate.category.as_str(), candidate.recommended_intent);
        if last_status.get(&key) == Some(&ops_core::model::HandoffStatus::ExecutionAmbiguous) {
            candidate.autonomous.eligible = false;
            candidate.autonomous.manual_only = true;
            if !candidate.autonomous.reasons.iter().any(|r| r == AUTONOMOUS_RETRY_GUARD_AMBIGUOUS) {
                candidate.autonomous.reasons.push(AUTONOMOUS_RETRY_GUARD_AMBIGUOUS.to_string());
            }
        }
    }
}

/// Run one full policy pass over the given per-loop outcomes and persist
/// `fleet/policy-state.json`.
pub fn run_policy_pass<C: Clock>(
    repo: &Repo,
    clock: &C,
    registry: &FleetRegistry,
    outcomes: &[LoopOutcome<'_>],
    trace_id: &str,
) -> AppResult<PolicyState> {
    let mut candidates = candidates::generate_all(repo, outcomes)?;
    suppression::apply_all(&mut candidates, &registry.policy);

    let now_ms = clock.epoch_ms();
    let last_fired = cooldown::read_last_fired(repo)?;
    cooldown::apply(&mut candidates, &last_fired, now_ms, registry.policy.noise_controls.dedupe_window_seconds);

    let mode: PolicyMode = registry.mode();
    match (mode, registry.policy.autonomous.as_ref()) {
        (PolicyMode::GuardedAuto, Some(autonomous)) => {
            let handoff_outcomes = read_recent_handoff_outcomes(repo)?;
            let autopause = compute_autopause(autonomous, &handoff_outcomes);
            let mut gate = AutonomyGate::new(autonomous, &last_fired, now_ms, &autopause);
            for candidate in &mut candidates {
                if candidate.suppressed {
                    continue;
                }
                candidate.autonomous = gate.gate(candidate);
            }
            let last_status_by_key = read_last_status_by_key(repo)?;
            apply_retry_guard(&mut candidates, &last_status_by_key);
        }
        (PolicyMode::GuardedAuto, None) => {
            for candidate in &mut candidates {
                if !candidate.suppressed {
                    candidate.autonomous = ops_core::model::policy::AutonomyClassification::manual_only(vec![AUTONOMOUS_POLICY_NOT_CONFIGURED.to_string()]);
                }
            }
        }
        (PolicyMode::Advisory, _) => {
            for candidate in &mut candidates {
                if !candidate.suppressed {
                    candidate.autonomous = ops_core::model::policy::AutonomyClassification::manual_only(vec![AUTONOMOUS_MODE_NOT_GUARDED.to_string()]);
                }
            }
        }
    }

    cooldown::record_firings(repo, &candidates, now_ms, trace_id)?;

    let timestamp = clock.now_rfc3339();
    governance::record(repo, mode, registry.policy.autonomous.as_ref(), trace_id, &timestamp)?;

    let state = build_state(candidates, trace_id);
    ops_storage::atomic_json::write_json_atomic(&repo.fleet_policy_state_json(), &state)?;
    Ok(state)
}

fn build_state(candidates: Vec<PolicyCandidate>, trace_id: &str) -> PolicyState {
    let mut counts = PolicyCounts::default();
    let mut by_autonomy_reason = BTreeMap::new();
    let mut reason_codes = BTreeSet::new();

    counts.candidate_count = candidates.len();
    for candidate in &candidates {
        if candidate.suppressed {
            counts.suppressed_count += 1;
            if candidate.suppression_scope == Some(ops_core::model::policy::SuppressionScope::Cooldown) {
                reason_codes.insert(FLEET_ACTIONS_DEDUPED.to_string());
            } else {
                reason_codes.insert(FLEET_ACTIONS_SUPPRESSED.to_string());
            }
        } else {
            counts.unsuppressed_count += 1;
            reason_codes.insert(FLEET_ACTION_REQUIRED.to_string());
        }

        if candidate.autonomous.eligible {
            counts.auto_eligible_count += 1;
            reason_codes.insert(FLEET_AUTO_CANDIDATES_ELIGIBLE.to_string());
        } else if candidate.autonomous.manual_only {
            counts.manual_only_count += 1;
        }

        for reason in &candidate.autonomous.reasons {
            *by_autonomy_reason.entry(reason.clone()).or_insert(0) += 1;
            match reason.as_str() {
                "autonomous_kill_switch_enabled" => {
                    reason_codes.insert(FLEET_AUTO_KILL_SWITCH_ENABLED.to_string());
                }
                "autonomous_rollout_scope_excluded" | "autonomous_rollout_canary_excluded" => {
                    reason_codes.insert(FLEET_AUTO_CANDIDATES_ROLLOUT_GATED.to_string());
                }
                "autonomous_rollout_paused_manual" | "autonomous_rollout_paused_auto" => {
                    reason_codes.insert(FLEET_AUTO_CANDIDATES_PAUSED.to_string());
                }
                "autonomous_autopause_failure_spike" | "autonomous_autopause_ambiguous_spike" => {
                    reason_codes.insert(FLEET_AUTO_CANDIDATES_AUTOPAUSE_TRIGGERED.to_string());
                }
                "autonomous_max_actions_per_loop_exceeded"
                | "autonomous_max_actions_per_run_exceeded"
                | "autonomous_cooldown_active"
                | "category_not_allowlisted"
                | "intent_not_allowlisted"
                | "autonomous_below_min_severity"
                | "autonomous_below_min_confidence" => {
                    reason_codes.insert(FLEET_AUTO_CANDIDATES_SAFETY_BLOCKED.to_string());
                }
                _ => {}
            }
        }
    }

    PolicyState {
        candidates,
        counts,
        summary: PolicySummary { by_autonomy_reason },
        reason_codes,
        trace_id: trace_id.to_string(),
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
