// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ops_core::model::policy::{AutonomyClassification, Category};
use ops_core::model::projection::Confidence;

fn candidate(loop_id: &str, category: Category) -> PolicyCandidate {
    PolicyCandidate {
        candidate_id: PolicyCandidate::make_id(loop_id, category),
        loop_id: loop_id.to_string(),
        category,
        severity: category.default_severity(),
        confidence: Confidence::High,
        rationale: "test".to_string(),
        recommended_intent: "cancel".to_string(),
        suppressed: false,
        suppression_scope: None,
        suppression_reason: None,
        autonomous: AutonomyClassification::default(),
    }
}

#[test]
fn candidate_within_window_is_suppressed_as_cooldown() {
    let mut candidates = vec![candidate("loop-a", Category::HealthCritical)];
    let mut last_fired = std::collections::BTreeMap::new();
    last_fired.insert("loop-a:health_critical".to_string(), 1_000_000);

    apply(&mut candidates, &last_fired, 1_000_000 + 5_000, 300);
    assert!(candidates[0].suppressed);
    assert_eq!(candidates[0].suppression_scope, Some(SuppressionScope::Cooldown));
    assert_eq!(candidates[0].suppression_reason.as_deref(), Some(ADVISORY_COOLDOWN_ACTIVE));
}

#[test]
fn candidate_outside_window_is_not_suppressed() {
    let mut candidates = vec![candidate("loop-a", Category::HealthCritical)];
    let mut last_fired = std::collections::BTreeMap::new();
    last_fired.insert("loop-a:health_critical".to_string(), 1_000_000);

    apply(&mut candidates, &last_fired, 1_000_000 + 301_000, 300);
    assert!(!candidates[0].suppressed);
}

#[test]
fn already_suppressed_candidate_is_left_alone() {
    let mut candidates = vec![candidate("loop-a", Category::HealthCritical)];
    candidates[0].suppressed = true;
    candidates[0].suppression_scope = Some(SuppressionScope::Loop);
    let mut last_fired = std::collections::BTreeMap::new();
    last_fired.insert("loop-a:health_critical".to_string(), 1_000_000);

    apply(&mut candidates, &last_fired, 1_000_000 + 5_000, 300);
    assert_eq!(candidates[0].suppression_scope, Some(SuppressionScope::Loop));
}

#[test]
fn round_trip_record_and_read_last_fired() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repo::new(dir.path());
    let candidates = vec![candidate("loop-a", Category::HealthCritical)];

    record_firings(&repo, &candidates, 42_000, "trace-1").unwrap();
    let last_fired = read_last_fired(&repo).unwrap();
    assert_eq!(last_fired.get("loop-a:health_critical"), Some(&42_000));
}

#[test]
fn suppressed_candidates_are_never_recorded_as_fired() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repo::new(dir.path());
    let mut candidates = vec![candidate("loop-a", Category::HealthCritical)];
    candidates[0].suppressed = true;

    record_firings(&repo, &candidates, 42_000, "trace-1").unwrap();
    let last_fired = read_last_fired(&repo).unwrap();
    assert!(last_fired.is_empty());
}
