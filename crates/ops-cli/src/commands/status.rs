// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `status` (spec §6): read-only projection of one loop's last reconciled
//! snapshot through its registry-declared transport. Never reconciles.

use ops_core::canonical::canonicalize;
use ops_transport::Transport;
use serde_json::Value;

use crate::commands::support::{find_loop, load_registry};
use crate::context::Ctx;
use crate::exit_error::ExitError;

pub async fn handle(ctx: &Ctx, loop_id: &str) -> Result<Value, ExitError> {
    let registry = load_registry(&ctx.repo)?;
    let entry = find_loop(&registry, loop_id)?;
    let transport = ops_transport::build_transport(&ctx.repo, &entry).map_err(ExitError::from)?;

    let snapshot = transport.snapshot(loop_id).await.map_err(ExitError::from)?;
    let canonical = canonicalize(&snapshot).map_err(|e| ExitError::usage(e.to_string()))?;
    serde_json::from_slice(&canonical).map_err(|e| ExitError::usage(e.to_string()))
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
