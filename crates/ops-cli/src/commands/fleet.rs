// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fleet-reconcile`, `fleet-policy`, `fleet-status`, `fleet-handoff`
//! (spec §6): the fleet-wide passes, run in that pipeline order against
//! one persisted fleet registry.

use ops_engine::fleet::{reconcile_fleet, FleetReconcileInput};
use ops_handoff::engine::{run_handoff_pass, ExecuteMode, HandoffState};
use ops_policy::candidates::LoopOutcome;
use ops_policy::engine::{run_policy_pass, PolicyState};
use serde_json::Value;

use crate::commands::support::load_registry;
use crate::context::Ctx;
use crate::exit_error::ExitError;

pub async fn reconcile(ctx: &Ctx, trace_id: Option<String>, deterministic_order: bool, max_parallel: usize) -> Result<Value, ExitError> {
    let registry = load_registry(&ctx.repo)?;
    let trace_id = ctx.trace_id(trace_id);

    let input = FleetReconcileInput {
        registry: &registry,
        trace_id: &trace_id,
        deterministic_order,
        max_parallel,
        config: &ctx.config.reconciler,
    };
    let state = reconcile_fleet(&ctx.repo, ctx.clock.clone(), input).await.map_err(ExitError::from)?;
    serde_json::to_value(&state).map_err(|e| ExitError::usage(e.to_string()))
}

pub fn status(ctx: &Ctx) -> Result<Value, ExitError> {
    let state: Value = ops_storage::atomic_json::read_json(&ctx.repo.fleet_state_json())
        .map_err(ExitError::from)?
        .ok_or_else(|| ExitError::usage("no fleet state recorded yet; run fleet-reconcile first"))?;
    Ok(state)
}

pub fn policy(ctx: &Ctx, trace_id: Option<String>) -> Result<Value, ExitError> {
    let registry = load_registry(&ctx.repo)?;
    let trace_id = ctx.trace_id(trace_id);

    let fleet_state: ops_engine::fleet::FleetState = ops_storage::atomic_json::read_json(&ctx.repo.fleet_state_json())
        .map_err(ExitError::from)?
        .ok_or_else(|| ExitError::usage("no fleet state recorded yet; run fleet-reconcile first"))?;

    let outcomes: Vec<LoopOutcome<'_>> = fleet_state
        .results
        .iter()
        .map(|result| LoopOutcome { loop_id: &result.loop_id, reconcile_failed: result.status == "failed" })
        .collect();

    let state: PolicyState = run_policy_pass(&ctx.repo, &ctx.clock, &registry, &outcomes, &trace_id).map_err(ExitError::from)?;
    serde_json::to_value(&state).map_err(|e| ExitError::usage(e.to_string()))
}

pub async fn handoff(
    ctx: &Ctx,
    trace_id: Option<String>,
    execute: Vec<String>,
    confirm: bool,
    autonomous_execute: bool,
) -> Result<Value, ExitError> {
    let registry = load_registry(&ctx.repo)?;
    let trace_id = ctx.trace_id(trace_id);

    let policy_state: PolicyState = ops_storage::atomic_json::read_json(&ctx.repo.fleet_policy_state_json())
        .map_err(ExitError::from)?
        .ok_or_else(|| ExitError::usage("no fleet policy state recorded yet; run fleet-policy first"))?;

    let mode = if autonomous_execute {
        ExecuteMode::Autonomous
    } else if !execute.is_empty() {
        ExecuteMode::Manual { intent_ids: &execute, confirm }
    } else {
        ExecuteMode::Plan
    };

    let state: HandoffState =
        run_handoff_pass(&ctx.repo, &ctx.clock, &registry, &policy_state.candidates, &trace_id, mode)
            .await
            .map_err(ExitError::from)?;
    serde_json::to_value(&state).map_err(|e| ExitError::usage(e.to_string()))
}

#[cfg(test)]
#[path = "fleet_tests.rs"]
mod tests;
