// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared lookups every single-loop and fleet command needs: loading the
//! registry and resolving one enabled loop entry out of it.

use ops_core::model::registry::{FleetRegistry, LoopEntry};
use ops_core::repo::Repo;

use crate::exit_error::ExitError;

pub fn load_registry(repo: &Repo) -> Result<FleetRegistry, ExitError> {
    ops_storage::atomic_json::read_json(&repo.fleet_registry_json())
        .map_err(ExitError::from)?
        .ok_or_else(|| ExitError::usage("fleet registry not found at <repo>/.superloop/ops-manager/fleet/registry.v1.json"))
}

pub fn find_loop(registry: &FleetRegistry, loop_id: &str) -> Result<LoopEntry, ExitError> {
    registry
        .loops
        .iter()
        .find(|entry| entry.loop_id == loop_id && entry.enabled)
        .cloned()
        .ok_or_else(|| ExitError::usage(format!("unknown or disabled loop '{loop_id}'")))
}

#[cfg(test)]
#[path = "support_tests.rs"]
mod tests;
