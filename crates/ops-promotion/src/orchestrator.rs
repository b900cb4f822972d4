// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrates gate evaluation and apply dispatch (spec §4.9): `dry_run`
//! never applies, `apply` refuses unless the gates say `promote`, and
//! `rollback` always runs regardless of gate outcome.

use ops_core::clock::Clock;
use ops_core::config::PromotionConfig;
use ops_core::error::{AppError, AppResult};
use ops_core::model::registry::FleetRegistry;
use ops_core::repo::Repo;
use serde::{Deserialize, Serialize};

use crate::apply::{self, ApplyIntent, ApplyOutcome, ApplyRequest};
use crate::gates::{self, GateReport, PromotionDecision};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionMode {
    DryRun,
    Apply,
    Rollback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorResult {
    pub gates: GateReport,
    pub applied: Option<ApplyOutcome>,
}

impl OrchestratorResult {
    /// `--fail-on-hold` maps a `hold` decision to a non-zero exit; the CLI
    /// layer reads this instead of re-deriving it from `gates.decision`.
    pub fn should_fail_on_hold(&self) -> bool {
        self.gates.decision == PromotionDecision::Hold
    }
}

/// Run one promotion pass: evaluate gates, persist the snapshot, then
/// dispatch `apply`/`rollback` per `mode`. `request.intent` is only
/// consulted for `Apply`/`Rollback`; `DryRun` ignores it.
pub async fn run<C: Clock>(
    repo: &Repo,
    clock: &C,
    registry: &FleetRegistry,
    config: &PromotionConfig,
    mode: PromotionMode,
    request: Option<&ApplyRequest>,
) -> AppResult<OrchestratorResult> {
    let report = gates::evaluate_gates(repo, clock, registry, config)?;
    ops_storage::atomic_json::write_json_atomic(&repo.fleet_promotion_state_json(), &report)?;

    let applied = match mode {
        PromotionMode::DryRun => None,
        PromotionMode::Apply => {
            if report.decision != PromotionDecision::Promote {
                return Err(AppError::validation("apply", "promotion gates did not pass; apply refused"));
            }
            let request = request.ok_or_else(|| AppError::validation("apply", "apply mode requires a request"))?;
            if matches!(request.intent, ApplyIntent::Rollback) {
                return Err(AppError::validation("apply", "rollback must be dispatched via --mode rollback"));
            }
            Some(apply::apply(repo, clock, request)?)
        }
        PromotionMode::Rollback => {
            let request = request.ok_or_else(|| AppError::validation("rollback", "rollback mode requires a request"))?;
            if !matches!(request.intent, ApplyIntent::Rollback) {
                return Err(AppError::validation("rollback", "rollback mode only accepts the rollback intent"));
            }
            Some(apply::apply(repo, clock, request)?)
        }
    };

    Ok(OrchestratorResult { gates: report, applied })
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
