// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `alert-dispatch` (spec §6/§4.8): dispatch a single loop's new
//! escalations through the configured sinks.

use ops_core::config::AlertSinksConfig;
use serde_json::Value;

use crate::context::Ctx;
use crate::exit_error::ExitError;

pub async fn dispatch(ctx: &Ctx, loop_id: &str) -> Result<Value, ExitError> {
    let config = match crate::env::alert_sinks_file() {
        Some(path) => AlertSinksConfig::load(&path).map_err(ExitError::from)?,
        None => AlertSinksConfig::default(),
    };

    let outcome = ops_alerts::dispatch::dispatch_for_loop(&ctx.repo, &config, loop_id).await.map_err(ExitError::from)?;
    serde_json::to_value(&outcome).map_err(|e| ExitError::usage(e.to_string()))
}

#[cfg(test)]
#[path = "alerts_tests.rs"]
mod tests;
