// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrates the handoff plan/execute pipeline (spec §4.7) and writes
//! `fleet/handoff-state.json`.

use serde::{Deserialize, Serialize};

use ops_core::clock::Clock;
use ops_core::error::{AppError, AppResult};
use ops_core::model::handoff::HandoffIntent;
use ops_core::model::policy::PolicyCandidate;
use ops_core::model::registry::{FleetRegistry, PolicyMode};
use ops_core::repo::Repo;

use crate::execute;
use crate::intents;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffState {
    pub intents: Vec<HandoffIntent>,
    pub trace_id: String,
}

/// Execute mode requested by the caller. `Plan` only materializes and
/// persists intents; `Manual`/`Autonomous` additionally dispatch.
pub enum ExecuteMode<'a> {
    Plan,
    Manual { intent_ids: &'a [String], confirm: bool },
    Autonomous,
}

/// Run one plan pass, optionally followed by dispatch, and persist
/// `fleet/handoff-state.json`.
pub async fn run_handoff_pass<C: Clock>(
    repo: &Repo,
    clock: &C,
    registry: &FleetRegistry,
    candidates: &[PolicyCandidate],
    trace_id: &str,
    mode: ExecuteMode<'_>,
) -> AppResult<HandoffState> {
    let mut plan = intents::plan(registry, candidates, trace_id);
    intents::persist_new(repo, &plan)?;

    match mode {
        ExecuteMode::Plan => {}
        ExecuteMode::Manual { intent_ids, confirm } => {
            if !confirm {
                return Err(AppError::validation(
                    "execute",
                    "manual execution requires --execute and --confirm together",
                ));
            }
            execute::dispatch_manual(repo, clock, registry, &mut plan, intent_ids, trace_id).await?;
        }
        ExecuteMode::Autonomous => {
            if registry.mode() != PolicyMode::GuardedAuto {
                return Err(AppError::validation(
                    "execute",
                    "autonomous execution requires policy mode guarded_auto",
                ));
            }
            let last_status = execute::read_last_status(repo)?;
            execute::apply_retry_guard(&mut plan, &last_status);
            execute::dispatch_autonomous(repo, clock, registry, &mut plan, trace_id).await?;
        }
    }

    let state = HandoffState { intents: plan, trace_id: trace_id.to_string() };
    ops_storage::atomic_json::write_json_atomic(&repo.fleet_handoff_state_json(), &state)?;
    Ok(state)
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
