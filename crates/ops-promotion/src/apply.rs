// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry-mutating promotion intents (spec §4.9 apply): `expand`,
//! `resume`, `rollback`. Mutating `AutonomousPolicy.governance`/`.rollout`
//! here is enough to trigger the next `ops_policy::governance::record`
//! pass's audit event — no separate signal is written from here.

use std::collections::BTreeMap;

use ops_core::clock::Clock;
use ops_core::error::{AppError, AppResult};
use ops_core::model::registry::{FleetRegistry, Governance};
use ops_core::repo::Repo;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "intent")]
pub enum ApplyIntent {
    Expand { step: u8 },
    Resume,
    Rollback,
}

#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub intent: ApplyIntent,
    pub by: String,
    pub approval_ref: String,
    pub rationale: String,
    pub review_by: String,
    pub idempotency_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutcome {
    pub intent: ApplyIntent,
    pub replayed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplyState {
    #[serde(default)]
    replays: BTreeMap<String, ApplyOutcome>,
}

fn apply_governance(governance: &mut Governance, request: &ApplyRequest, clock: &impl Clock) {
    governance.actor = request.by.clone();
    governance.approval_ref = request.approval_ref.clone();
    governance.rationale = request.rationale.clone();
    governance.review_by = request.review_by.clone();
    governance.changed_at = clock.now_rfc3339();
}

fn mutate(registry: &mut FleetRegistry, request: &ApplyRequest, clock: &impl Clock) -> AppResult<()> {
    let policy = registry
        .policy
        .autonomous
        .as_mut()
        .ok_or_else(|| AppError::validation("apply", "autonomous policy is not configured"))?;

    match request.intent {
        ApplyIntent::Expand { step } => {
            let rollout = policy.rollout.get_or_insert_with(Default::default);
            rollout.canary_percent = rollout.canary_percent.saturating_add(step).min(100);
            rollout.pause.manual = false;
        }
        ApplyIntent::Resume => {
            let rollout = policy.rollout.get_or_insert_with(Default::default);
            rollout.pause.manual = false;
        }
        ApplyIntent::Rollback => {
            let rollout = policy.rollout.get_or_insert_with(Default::default);
            rollout.pause.manual = true;
        }
    }

    apply_governance(&mut policy.governance, request, clock);
    Ok(())
}

/// Apply one promotion intent to the registry, replaying a prior result
/// instead of mutating again when `idempotencyKey` has already been seen.
pub fn apply<C: Clock>(repo: &Repo, clock: &C, request: &ApplyRequest) -> AppResult<ApplyOutcome> {
    let state_path = repo.fleet_promotion_apply_state_json();
    let mut state: ApplyState = ops_storage::atomic_json::read_json(&state_path)?.unwrap_or_default();

    if let Some(prior) = state.replays.get(&request.idempotency_key) {
        return Ok(ApplyOutcome { intent: prior.intent, replayed: true });
    }

    let registry_path = repo.fleet_registry_json();
    let mut registry: FleetRegistry = ops_storage::atomic_json::read_json(&registry_path)?
        .ok_or_else(|| AppError::validation("apply", "fleet registry is missing"))?;

    mutate(&mut registry, request, clock)?;
    ops_storage::atomic_json::write_json_atomic(&registry_path, &registry)?;

    let outcome = ApplyOutcome { intent: request.intent, replayed: false };
    state.replays.insert(request.idempotency_key.clone(), outcome.clone());
    ops_storage::atomic_json::write_json_atomic(&state_path, &state)?;

    Ok(outcome)
}

#[cfg(test)]
#[path = "apply_tests.rs"]
mod tests;
