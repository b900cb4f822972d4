// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Autonomy gating (spec §4.6 step 4, `guarded_auto` only): for each
//! surviving candidate, evaluate every disqualifier and collect every
//! applicable reason (not just the first) for observability, then derive
//! `eligible = reasons.is_empty()`.

use ops_core::model::policy::{AutonomyClassification, PolicyCandidate, RolloutClassification};
use ops_core::model::projection::Confidence;
use ops_core::model::registry::{AutonomousPolicy, ConfidenceThreshold};
use ops_core::rollout::cohort_bucket;
use std::collections::BTreeMap;

fn confidence_rank(c: Confidence) -> u8 {
    match c {
        Confidence::Low => 0,
        Confidence::Medium => 1,
        Confidence::High => 2,
    }
}

fn confidence_threshold_rank(c: ConfidenceThreshold) -> u8 {
    match c {
        ConfidenceThreshold::Low => 0,
        ConfidenceThreshold::Medium => 1,
        ConfidenceThreshold::High => 2,
    }
}

/// A handoff telemetry outcome, the minimal slice autopause sampling needs.
/// Field names mirror what `ops-handoff` appends to
/// `fleet/telemetry/handoff.jsonl` (see `ops_core::model::HandoffStatus`).
#[derive(Debug, Clone)]
pub struct HandoffOutcome {
    pub status: ops_core::model::HandoffStatus,
}

#[derive(Debug, Clone, Default)]
pub struct AutopauseResult {
    pub active: bool,
    pub reasons: Vec<&'static str>,
}

/// Evaluate rollout auto-pause (spec §4.6 step 4f(iv)) over the most recent
/// `lookbackExecutions` handoff outcomes.
pub fn compute_autopause(policy: &AutonomousPolicy, recent_outcomes: &[HandoffOutcome]) -> AutopauseResult {
    let Some(rollout) = &policy.rollout else {
        return AutopauseResult::default();
    };
    let Some(auto) = &rollout.pause.auto else {
        return AutopauseResult::default();
    };
    if !auto.enabled {
        return AutopauseResult::default();
    }

    let window_len = auto.lookback_executions as usize;
    let window = if recent_outcomes.len() > window_len {
        &recent_outcomes[recent_outcomes.len() - window_len..]
    } else {
        recent_outcomes
    };

    let attempted = window
        .iter()
        .filter(|o| {
            matches!(
                o.status,
                ops_core::model::HandoffStatus::Executed
                    | ops_core::model::HandoffStatus::ExecutionAmbiguous
                    | ops_core::model::HandoffStatus::ExecutionFailed
            )
        })
        .count();

    if attempted < auto.min_sample_size as usize {
        return AutopauseResult::default();
    }

    let failed = window
        .iter()
        .filter(|o| o.status == ops_core::model::HandoffStatus::ExecutionFailed)
        .count();
    let ambiguous = window
        .iter()
        .filter(|o| o.status == ops_core::model::HandoffStatus::ExecutionAmbiguous)
        .count();

    let failure_rate = failed as f64 / attempted as f64;
    let ambiguity_rate = ambiguous as f64 / attempted as f64;

    let mut reasons = Vec::new();
    if failure_rate >= auto.failure_rate_threshold {
        reasons.push("autonomous_autopause_failure_spike");
    }
    if ambiguity_rate >= auto.ambiguity_rate_threshold {
        reasons.push("autonomous_autopause_ambiguous_spike");
    }
    if !reasons.is_empty() {
        reasons.push("autonomous_rollout_paused_auto");
    }

    AutopauseResult {
        active: !reasons.is_empty(),
        reasons,
    }
}

/// Stateful gate walking candidates in stable order so `maxActionsPerLoop`/
/// `maxActionsPerRun` count only candidates already deemed eligible.
pub struct AutonomyGate<'a> {
    policy: &'a AutonomousPolicy,
    last_fired: &'a BTreeMap<String, u64>,
    now_ms: u64,
    autopause: &'a AutopauseResult,
    loop_action_counts: BTreeMap<String, u32>,
    run_action_count: u32,
}

impl<'a> AutonomyGate<'a> {
    pub fn new(policy: &'a AutonomousPolicy, last_fired: &'a BTreeMap<String, u64>, now_ms: u64, autopause: &'a AutopauseResult) -> Self {
        Self {
            policy,
            last_fired,
            now_ms,
            autopause,
            loop_action_counts: BTreeMap::new(),
            run_action_count: 0,
        }
    }

    pub fn gate(&mut self, candidate: &PolicyCandidate) -> AutonomyClassification {
        let mut reasons = Vec::new();

        // a) allowlist
        if !self.policy.allow.categories.is_empty() && !self.policy.allow.categories.contains(candidate.category.as_str()) {
            reasons.push("category_not_allowlisted".to_string());
        }
        if !self.policy.allow.intents.is_empty() && !self.policy.allow.intents.contains(&candidate.recommended_intent) {
            reasons.push("intent_not_allowlisted".to_string());
        }

        // b) thresholds
        if candidate.severity < self.policy.thresholds.min_severity {
            reasons.push("autonomous_below_min_severity".to_string());
        }
        if confidence_rank(candidate.confidence) < confidence_threshold_rank(self.policy.thresholds.min_confidence) {
            reasons.push("autonomous_below_min_confidence".to_string());
        }

        // c) kill switch
        if self.policy.safety.kill_switch {
            reasons.push("autonomous_kill_switch_enabled".to_string());
        }

        // d) max actions, counting already-eligible candidates so far
        let loop_count = *self.loop_action_counts.get(&candidate.loop_id).unwrap_or(&0);
        if loop_count >= self.policy.safety.max_actions_per_loop {
            reasons.push("autonomous_max_actions_per_loop_exceeded".to_string());
        }
        if self.run_action_count >= self.policy.safety.max_actions_per_run {
            reasons.push("autonomous_max_actions_per_run_exceeded".to_string());
        }

        // e) cooldown against candidateId history
        if let Some(&fired_at_ms) = self.last_fired.get(&candidate.candidate_id) {
            let window_ms = self.policy.safety.cooldown_seconds.saturating_mul(1000);
            if self.now_ms.saturating_sub(fired_at_ms) < window_ms {
                reasons.push("autonomous_cooldown_active".to_string());
            }
        }

        // f) rollout
        let mut rollout_classification = None;
        if let Some(rollout) = &self.policy.rollout {
            if !rollout.scope.loop_ids.is_empty() && !rollout.scope.loop_ids.iter().any(|id| id == &candidate.loop_id) {
                reasons.push("autonomous_rollout_scope_excluded".to_string());
            }

            let bucket = cohort_bucket(&candidate.loop_id, &rollout.selector.salt);
            let in_cohort = bucket < rollout.canary_percent;
            rollout_classification = Some(RolloutClassification { in_cohort, bucket });
            if !in_cohort {
                reasons.push("autonomous_rollout_canary_excluded".to_string());
            }

            if rollout.pause.manual {
                reasons.push("autonomous_rollout_paused_manual".to_string());
            }

            if self.autopause.active {
                reasons.extend(self.autopause.reasons.iter().map(|r| r.to_string()));
            }
        }

        let eligible = reasons.is_empty();
        if eligible {
            *self.loop_action_counts.entry(candidate.loop_id.clone()).or_insert(0) += 1;
            self.run_action_count += 1;
        }

        AutonomyClassification {
            eligible,
            manual_only: !eligible,
            reasons,
            rollout: rollout_classification,
        }
    }
}

#[cfg(test)]
#[path = "autonomy_tests.rs"]
mod tests;
