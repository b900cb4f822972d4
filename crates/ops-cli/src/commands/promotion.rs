// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `promotion-gates`, `promotion-apply`, `promotion-orchestrate` (spec
//! §6/§4.9). `promotion-apply` is `promotion-orchestrate` with its mode
//! picked from the requested intent (`Apply` unless the intent is
//! `Rollback`), so both verbs share the same gate-then-apply pipeline and
//! the same exit code for a refused non-promote apply.

use ops_core::error::AppError;
use ops_promotion::apply::{ApplyIntent, ApplyRequest};
use ops_promotion::gates::{evaluate_gates, PromotionDecision};
use ops_promotion::orchestrator::{self, OrchestratorResult, PromotionMode};
use serde_json::Value;

use crate::commands::support::load_registry;
use crate::context::Ctx;
use crate::exit_error::ExitError;

pub fn gates(ctx: &Ctx, fail_on_hold: bool) -> Result<Value, ExitError> {
    let registry = load_registry(&ctx.repo)?;
    let report = evaluate_gates(&ctx.repo, &ctx.clock, &registry, &ctx.config.promotion).map_err(ExitError::from)?;

    if fail_on_hold && report.decision == PromotionDecision::Hold {
        let value = serde_json::to_value(&report).map_err(|e| ExitError::usage(e.to_string()))?;
        return Err(ExitError::gated_hold(value.to_string()));
    }
    serde_json::to_value(&report).map_err(|e| ExitError::usage(e.to_string()))
}

/// Translate the orchestrator's refusal of a non-promote apply into exit
/// code 7; everything else falls back to the generic `AppError` mapping.
fn run_mode(result: Result<OrchestratorResult, AppError>) -> Result<Value, ExitError> {
    match result {
        Ok(result) => serde_json::to_value(&result).map_err(|e| ExitError::usage(e.to_string())),
        Err(AppError::Validation { message, .. }) if message.contains("apply refused") => {
            Err(ExitError::policy_decision_mismatch(message))
        }
        Err(err) => Err(ExitError::from(err)),
    }
}

pub async fn apply(ctx: &Ctx, request: ApplyRequest) -> Result<Value, ExitError> {
    let registry = load_registry(&ctx.repo)?;
    let mode = if matches!(request.intent, ApplyIntent::Rollback) { PromotionMode::Rollback } else { PromotionMode::Apply };

    let result = orchestrator::run(&ctx.repo, &ctx.clock, &registry, &ctx.config.promotion, mode, Some(&request)).await;
    run_mode(result)
}

pub async fn orchestrate(ctx: &Ctx, mode: PromotionMode, request: Option<ApplyRequest>) -> Result<Value, ExitError> {
    let registry = load_registry(&ctx.repo)?;
    let result = orchestrator::run(&ctx.repo, &ctx.clock, &registry, &ctx.config.promotion, mode, request.as_ref()).await;
    run_mode(result)
}

#[cfg(test)]
#[path = "promotion_tests.rs"]
mod tests;
