use super::*;
use ops_core::repo::Repo;
use ops_core::test_support::registry_fixture;

use crate::config::OpsManagerConfig;

fn seeded_ctx(dir: &std::path::Path) -> Ctx {
    let repo = Repo::new(dir);
    ops_storage::atomic_json::write_json_atomic(&repo.fleet_registry_json(), &registry_fixture("fleet-a", &["loop-a"]))
        .expect("write registry");
    Ctx::new(repo, OpsManagerConfig::default())
}

#[test]
fn gates_hold_for_the_default_advisory_registry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = seeded_ctx(dir.path());
    let value = gates(&ctx, false).expect("gates");
    assert_eq!(value["decision"], "hold");
}

#[test]
fn fail_on_hold_turns_a_hold_decision_into_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = seeded_ctx(dir.path());
    let err = gates(&ctx, true).expect_err("hold should fail closed");
    assert_eq!(err.code, crate::exit_error::GATED_HOLD);
}

#[tokio::test]
async fn apply_refuses_when_gates_are_not_promote() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = seeded_ctx(dir.path());

    let request = ApplyRequest {
        intent: ApplyIntent::Resume,
        by: "operator".into(),
        approval_ref: "approval-1".into(),
        rationale: "unblock the loop".into(),
        review_by: "2026-12-31T00:00:00Z".into(),
        idempotency_key: "apply-1".into(),
    };
    let err = apply(&ctx, request).await.expect_err("hold should refuse apply");
    assert_eq!(err.code, crate::exit_error::POLICY_DECISION_MISMATCH);
}

#[tokio::test]
async fn orchestrate_dry_run_never_applies() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = seeded_ctx(dir.path());
    let value = orchestrate(&ctx, PromotionMode::DryRun, None).await.expect("dry run");
    assert!(value["applied"].is_null());
}
