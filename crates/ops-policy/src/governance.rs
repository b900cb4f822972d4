// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Governance audit (spec §4.6 step 5): an append-only log of every
//! detected change to the autonomous policy's governance/controls block or
//! to `policy.mode`. The "prior snapshot" it diffs against is simply the
//! last event this module itself appended — no separate state file.

use ops_core::error::AppResult;
use ops_core::model::registry::{AllowList, AutonomousPolicy, AutonomyThresholds, Governance, PolicyMode, RolloutConfig, SafetyConfig};
use ops_core::repo::Repo;
use serde::{Deserialize, Serialize};

pub const POLICY_INITIALIZED: &str = "autonomous_policy_initialized";
pub const POLICY_MUTATED: &str = "autonomous_policy_mutated";
pub const MODE_TOGGLED: &str = "autonomous_mode_toggled";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlsSnapshot {
    pub allow: AllowList,
    pub thresholds: AutonomyThresholds,
    pub safety: SafetyConfig,
    pub rollout: Option<RolloutConfig>,
}

impl From<&AutonomousPolicy> for ControlsSnapshot {
    fn from(policy: &AutonomousPolicy) -> Self {
        Self {
            allow: policy.allow.clone(),
            thresholds: policy.thresholds,
            safety: policy.safety,
            rollout: policy.rollout.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceAuditEvent {
    pub event_type: String,
    pub trace_id: String,
    pub mode: PolicyMode,
    #[serde(default)]
    pub previous_mode: Option<PolicyMode>,
    #[serde(default)]
    pub governance: Option<Governance>,
    #[serde(default)]
    pub controls: Option<ControlsSnapshot>,
    #[serde(default)]
    pub previous_governance: Option<Governance>,
    #[serde(default)]
    pub previous_controls: Option<ControlsSnapshot>,
    pub timestamp: String,
}

fn audit_path(repo: &Repo) -> std::path::PathBuf {
    repo.fleet_telemetry("policy-governance")
}

fn last_event(repo: &Repo) -> AppResult<Option<GovernanceAuditEvent>> {
    let rows: Vec<(u64, GovernanceAuditEvent)> = ops_storage::jsonl::read_since_typed(&audit_path(repo), 0)?;
    Ok(rows.into_iter().last().map(|(_, event)| event))
}

/// Diff the current `(mode, autonomous)` against the last audit event and
/// append zero, one, or two new events (mutated and/or mode-toggled can
/// both fire in the same pass). Returns the event types actually appended.
pub fn record(repo: &Repo, mode: PolicyMode, autonomous: Option<&AutonomousPolicy>, trace_id: &str, timestamp: &str) -> AppResult<Vec<String>> {
    let prior = last_event(repo)?;
    let mut appended = Vec::new();

    let governance = autonomous.map(|p| p.governance.clone());
    let controls = autonomous.map(ControlsSnapshot::from);

    let Some(prior) = prior else {
        let event = GovernanceAuditEvent {
            event_type: POLICY_INITIALIZED.to_string(),
            trace_id: trace_id.to_string(),
            mode,
            previous_mode: None,
            governance,
            controls,
            previous_governance: None,
            previous_controls: None,
            timestamp: timestamp.to_string(),
        };
        ops_storage::jsonl::append_line(&audit_path(repo), &event)?;
        appended.push(POLICY_INITIALIZED.to_string());
        return Ok(appended);
    };

    if governance != prior.governance || controls != prior.controls {
        let event = GovernanceAuditEvent {
            event_type: POLICY_MUTATED.to_string(),
            trace_id: trace_id.to_string(),
            mode,
            previous_mode: Some(prior.mode),
            governance: governance.clone(),
            controls: controls.clone(),
            previous_governance: prior.governance.clone(),
            previous_controls: prior.controls.clone(),
            timestamp: timestamp.to_string(),
        };
        ops_storage::jsonl::append_line(&audit_path(repo), &event)?;
        appended.push(POLICY_MUTATED.to_string());
    }

    if mode != prior.mode {
        let event = GovernanceAuditEvent {
            event_type: MODE_TOGGLED.to_string(),
            trace_id: trace_id.to_string(),
            mode,
            previous_mode: Some(prior.mode),
            governance,
            controls,
            previous_governance: prior.governance,
            previous_controls: prior.controls,
            timestamp: timestamp.to_string(),
        };
        ops_storage::jsonl::append_line(&audit_path(repo), &event)?;
        appended.push(MODE_TOGGLED.to_string());
    }

    Ok(appended)
}

#[cfg(test)]
#[path = "governance_tests.rs"]
mod tests;
