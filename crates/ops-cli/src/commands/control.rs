// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `control` (spec §6/§4.4): send one control intent to a single loop
//! through its registry-declared transport. A single-shot CLI process
//! never races itself on one `loopId`, so unlike `ops-service` this
//! command calls `transport.control` directly with no lock.

use ops_transport::{ControlRequest, Transport};
use serde_json::Value;

use crate::commands::support::{find_loop, load_registry};
use crate::context::Ctx;
use crate::exit_error::ExitError;

#[allow(clippy::too_many_arguments)]
pub async fn handle(
    ctx: &Ctx,
    loop_id: &str,
    intent: &str,
    idempotency_key: &str,
    trace_id: Option<String>,
    payload: Value,
) -> Result<Value, ExitError> {
    if intent.is_empty() || idempotency_key.is_empty() {
        return Err(ExitError::usage("intent and idempotency-key are required"));
    }

    let registry = load_registry(&ctx.repo)?;
    let entry = find_loop(&registry, loop_id)?;
    let transport = ops_transport::build_transport(&ctx.repo, &entry).map_err(ExitError::from)?;

    let request = ControlRequest {
        loop_id: loop_id.to_string(),
        intent: intent.to_string(),
        idempotency_key: idempotency_key.to_string(),
        trace_id: ctx.trace_id(trace_id),
        payload,
    };
    let outcome = transport.control(request).await.map_err(ExitError::from)?;
    serde_json::to_value(&outcome).map_err(|e| ExitError::usage(e.to_string()))
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
