// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ops_core::model::policy::{AutonomyClassification, Category};
use ops_core::model::projection::Confidence;
use ops_core::test_support::registry_fixture;

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
fn suppressed_candidates_produce_no_intent() {
    let registry = registry_fixture("fleet-1", &["loop-a"]);
    let mut c = candidate("loop-a", Category::HealthCritical);
    c.suppressed = true;
    let intents = plan(&registry, &[c], "trace-1");
    assert!(intents.is_empty());
}

#[test]
fn intent_carries_candidate_fields_and_starts_pending() {
    let registry = registry_fixture("fleet-1", &["loop-a"]);
    let c = candidate("loop-a", Category::HealthCritical);
    let intents = plan(&registry, &[c], "trace-1");

    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].loop_id, "loop-a");
    assert_eq!(intents[0].category, "health_critical");
    assert_eq!(intents[0].intent, "cancel");
    assert_eq!(intents[0].status, HandoffStatus::PendingOperatorConfirmation);
    assert!(intents[0].idempotency_key.starts_with("fleet-handoff-trace-1-"));
}

#[test]
fn idempotency_key_is_stable_for_the_same_trace_and_candidate() {
    let registry = registry_fixture("fleet-1", &["loop-a"]);
    let c = candidate("loop-a", Category::HealthCritical);
    let a = plan(&registry, &[c.clone()], "trace-1");
    let b = plan(&registry, &[c], "trace-1");
    assert_eq!(a[0].idempotency_key, b[0].idempotency_key);
}

#[test]
fn persist_new_is_append_only_and_skips_known_intents() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repo::new(dir.path());
    let registry = registry_fixture("fleet-1", &["loop-a"]);
    let c = candidate("loop-a", Category::HealthCritical);
    let intents = plan(&registry, &[c], "trace-1");

    persist_new(&repo, &intents).unwrap();
    persist_new(&repo, &intents).unwrap();

    let rows: Vec<(u64, HandoffIntent)> =
        ops_storage::jsonl::read_since_typed(&repo.ops_loop_intents_jsonl("loop-a"), 0).unwrap();
    assert_eq!(rows.len(), 1);
}
