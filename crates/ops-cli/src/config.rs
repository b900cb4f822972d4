// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-file TOML configuration for the CLI binary.
//!
//! `ReconcilerConfig`/`HorizonConfig`/`PromotionConfig` each default
//! sensibly on their own (spec §4), so one optional file holding any
//! subset of the three tables is enough; a missing `--config` loads
//! every table at its default. `AlertSinksConfig` is deliberately not
//! folded in here: it keeps its own spec-named
//! `OPS_MANAGER_ALERT_SINKS_FILE` path, since sinks carry secrets-env
//! references an operator may want to rotate independently of the rest
//! of the posture.

use std::path::Path;

use ops_core::config::{HorizonConfig, PromotionConfig, ReconcilerConfig};
use serde::Deserialize;

use crate::exit_error::ExitError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OpsManagerConfig {
    pub reconciler: ReconcilerConfig,
    pub horizon: HorizonConfig,
    pub promotion: PromotionConfig,
}

impl OpsManagerConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ExitError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .map_err(|e| ExitError::usage(format!("reading config file {}: {e}", path.display())))?;
        toml::from_str(&text).map_err(|e| ExitError::usage(format!("parsing config file {}: {e}", path.display())))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
