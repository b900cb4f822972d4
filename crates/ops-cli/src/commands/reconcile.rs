// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `reconcile` (spec §6): run one reconcile pass for a single loop
//! through its registry-declared transport.

use ops_engine::reconciler::Reconciler;
use serde_json::Value;

use crate::commands::support::{find_loop, load_registry};
use crate::context::Ctx;
use crate::exit_error::ExitError;

pub async fn handle(ctx: &Ctx, loop_id: &str, trace_id: Option<String>) -> Result<Value, ExitError> {
    let registry = load_registry(&ctx.repo)?;
    let entry = find_loop(&registry, loop_id)?;
    let transport = ops_transport::build_transport(&ctx.repo, &entry).map_err(ExitError::from)?;
    let trace_id = ctx.trace_id(trace_id);

    let reconciler = Reconciler::new(ctx.repo.clone(), ctx.clock.clone());
    let outcome = reconciler
        .reconcile(transport.as_ref(), loop_id, &trace_id, &ctx.config.reconciler)
        .await
        .map_err(ExitError::from)?;

    serde_json::to_value(&outcome).map_err(|e| ExitError::usage(e.to_string()))
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
