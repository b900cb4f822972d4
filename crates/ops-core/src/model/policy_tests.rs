// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn make_id_joins_loop_and_category() {
    assert_eq!(
        PolicyCandidate::make_id("loop-red", Category::HealthDegraded),
        "loop-red:health_degraded"
    );
}

#[test]
fn category_round_trips_through_str() {
    for category in Category::ALL {
        let s = category.as_str();
        assert_eq!(Category::from_str_opt(s), Some(category));
    }
}

#[test]
fn reconcile_failed_and_health_critical_are_critical_severity() {
    assert_eq!(Category::ReconcileFailed.default_severity(), Severity::Critical);
    assert_eq!(Category::HealthCritical.default_severity(), Severity::Critical);
    assert_eq!(Category::HealthDegraded.default_severity(), Severity::Warning);
}

#[test]
fn eligible_autonomy_has_no_reasons() {
    let classification = AutonomyClassification::eligible();
    assert!(classification.eligible);
    assert!(!classification.manual_only);
    assert!(classification.reasons.is_empty());
}

#[test]
fn manual_only_is_complement_of_eligible() {
    let classification = AutonomyClassification::manual_only(vec!["x".into()]);
    assert!(!classification.eligible);
    assert!(classification.manual_only);
}
