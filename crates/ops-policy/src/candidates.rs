// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Candidate generation (spec §4.6 step 1): map each fleet loop result and
//! its persisted health into zero or more [`PolicyCandidate`]s from the
//! fixed category set, with a deterministically derived severity and a
//! stable lex-by-`candidateId` order.

use ops_core::error::AppResult;
use ops_core::model::health::{Health, HealthStatus, ReasonCode};
use ops_core::model::policy::{AutonomyClassification, Category, PolicyCandidate};
use ops_core::model::projection::Confidence;
use ops_core::model::ProjectedState;
use ops_core::repo::Repo;

/// Per-loop inputs a fleet reconcile already persisted, read back here
/// rather than threaded through `FleetState` so the policy pass can run
/// standalone against whatever is currently on disk (e.g. in tests that
/// synthesize health/state without a full fleet reconcile).
fn loop_confidence(repo: &Repo, loop_id: &str) -> AppResult<Confidence> {
    let projected: Option<ProjectedState> = ops_storage::atomic_json::read_json(&repo.ops_loop_state_json(loop_id))?;
    Ok(projected.map(|p| p.transition.confidence).unwrap_or(Confidence::Low))
}

fn loop_health(repo: &Repo, loop_id: &str) -> AppResult<Option<Health>> {
    ops_storage::atomic_json::read_json(&repo.ops_loop_health_json(loop_id))
}

fn candidate(loop_id: &str, category: Category, confidence: Confidence, rationale: String) -> PolicyCandidate {
    PolicyCandidate {
        candidate_id: PolicyCandidate::make_id(loop_id, category),
        loop_id: loop_id.to_string(),
        category,
        severity: category.default_severity(),
        confidence,
        rationale,
        recommended_intent: "cancel".to_string(),
        suppressed: false,
        suppression_scope: None,
        suppression_reason: None,
        autonomous: AutonomyClassification::default(),
    }
}

/// One loop's reconcile/fleet outcome, the minimal slice of
/// `ops_engine::fleet::FleetLoopResult` candidate generation needs.
pub struct LoopOutcome<'a> {
    pub loop_id: &'a str,
    pub reconcile_failed: bool,
}

/// Generate every candidate for one loop from its fleet status and
/// persisted health, in fixed category order.
pub fn generate_for_loop(repo: &Repo, outcome: &LoopOutcome<'_>) -> AppResult<Vec<PolicyCandidate>> {
    let loop_id = outcome.loop_id;
    let mut out = Vec::new();

    if outcome.reconcile_failed {
        out.push(candidate(
            loop_id,
            Category::ReconcileFailed,
            Confidence::Low,
            format!("loop '{loop_id}' failed to reconcile (transport or projection failure)"),
        ));
    }

    let health = loop_health(repo, loop_id)?;
    let confidence = loop_confidence(repo, loop_id)?;

    if let Some(health) = health {
        match health.status {
            HealthStatus::Critical => out.push(candidate(
                loop_id,
                Category::HealthCritical,
                confidence,
                format!("loop '{loop_id}' health is critical ({:?})", health.reason_codes),
            )),
            HealthStatus::Degraded => out.push(candidate(
                loop_id,
                Category::HealthDegraded,
                confidence,
                format!("loop '{loop_id}' health is degraded ({:?})", health.reason_codes),
            )),
            HealthStatus::Healthy => {}
        }

        if health.reason_codes.contains(&ReasonCode::DivergenceDetected) {
            out.push(candidate(
                loop_id,
                Category::DivergenceDetected,
                confidence,
                format!("loop '{loop_id}' projection diverged from runtime artifacts"),
            ));
        }
        if health.reason_codes.contains(&ReasonCode::OrderingDriftDetected) {
            out.push(candidate(
                loop_id,
                Category::OrderingDriftDetected,
                confidence,
                format!("loop '{loop_id}' observed an out-of-order snapshot or event sequence"),
            ));
        }
        if health.reason_codes.contains(&ReasonCode::ControlAmbiguous) {
            out.push(candidate(
                loop_id,
                Category::ControlAmbiguous,
                confidence,
                format!("loop '{loop_id}' has an unresolved ambiguous control outcome"),
            ));
        }
    }

    Ok(out)
}

/// Generate and sort every candidate across the fleet by `candidateId`
/// (spec §4.6 step 1: "candidate ordering is stable (lex by candidateId)").
pub fn generate_all(repo: &Repo, outcomes: &[LoopOutcome<'_>]) -> AppResult<Vec<PolicyCandidate>> {
    let mut all = Vec::new();
    for outcome in outcomes {
        all.extend(generate_for_loop(repo, outcome)?);
    }
    all.sort_by(|a, b| a.candidate_id.cmp(&b.candidate_id));
    Ok(all)
}

#[cfg(test)]
#[path = "candidates_tests.rs"]
mod tests;
