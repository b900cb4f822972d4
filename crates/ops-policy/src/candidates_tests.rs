// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ops_core::model::health::{HealthStatus, ReasonCode, ThresholdProfile};
use ops_core::model::policy::Category;
use std::collections::BTreeSet;

fn write_health(repo: &Repo, loop_id: &str, status: HealthStatus, reason_codes: &[ReasonCode]) {
    let health = Health {
        status,
        reason_codes: reason_codes.iter().copied().collect::<BTreeSet<_>>(),
        thresholds: ThresholdProfile::Balanced.resolve(),
        trace_id: "trace-1".into(),
    };
    ops_storage::atomic_json::write_json_atomic(&repo.ops_loop_health_json(loop_id), &health).unwrap();
}

#[test]
fn reconcile_failed_always_produces_a_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repo::new(dir.path());
    let outcome = LoopOutcome {
        loop_id: "loop-a",
        reconcile_failed: true,
    };
    let candidates = generate_for_loop(&repo, &outcome).unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].category, Category::ReconcileFailed);
    assert_eq!(candidates[0].candidate_id, "loop-a:reconcile_failed");
}

#[test]
fn critical_health_produces_a_single_health_candidate_not_degraded() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repo::new(dir.path());
    write_health(&repo, "loop-a", HealthStatus::Critical, &[ReasonCode::TransportUnreachable]);

    let outcome = LoopOutcome {
        loop_id: "loop-a",
        reconcile_failed: false,
    };
    let candidates = generate_for_loop(&repo, &outcome).unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].category, Category::HealthCritical);
    assert_eq!(candidates[0].severity, ops_core::model::registry::Severity::Critical);
}

#[test]
fn divergence_and_drift_each_produce_their_own_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repo::new(dir.path());
    write_health(
        &repo,
        "loop-a",
        HealthStatus::Degraded,
        &[ReasonCode::DivergenceDetected, ReasonCode::OrderingDriftDetected],
    );

    let outcome = LoopOutcome {
        loop_id: "loop-a",
        reconcile_failed: false,
    };
    let candidates = generate_for_loop(&repo, &outcome).unwrap();
    let categories: BTreeSet<Category> = candidates.iter().map(|c| c.category).collect();
    assert!(categories.contains(&Category::HealthDegraded));
    assert!(categories.contains(&Category::DivergenceDetected));
    assert!(categories.contains(&Category::OrderingDriftDetected));
}

#[test]
fn healthy_with_no_reason_codes_produces_no_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repo::new(dir.path());
    write_health(&repo, "loop-a", HealthStatus::Healthy, &[]);

    let outcome = LoopOutcome {
        loop_id: "loop-a",
        reconcile_failed: false,
    };
    let candidates = generate_for_loop(&repo, &outcome).unwrap();
    assert!(candidates.is_empty());
}

#[test]
fn generate_all_sorts_by_candidate_id() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repo::new(dir.path());
    write_health(&repo, "loop-b", HealthStatus::Critical, &[]);
    write_health(&repo, "loop-a", HealthStatus::Critical, &[]);

    let outcomes = vec![
        LoopOutcome { loop_id: "loop-b", reconcile_failed: false },
        LoopOutcome { loop_id: "loop-a", reconcile_failed: false },
    ];
    let candidates = generate_all(&repo, &outcomes).unwrap();
    let ids: Vec<&str> = candidates.iter().map(|c| c.candidate_id.as_str()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}
