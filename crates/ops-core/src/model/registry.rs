// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `FleetRegistry` and `AutonomousPolicy` (spec §3).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Transport kind a loop entry is reached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    Local,
    SpriteService,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(rename = "baseUrl")]
    pub base_url: Option<String>,
    #[serde(rename = "tokenEnv")]
    pub token_env: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopEntry {
    #[serde(rename = "loopId")]
    pub loop_id: String,
    pub transport: TransportKind,
    #[serde(default)]
    pub service: Option<ServiceConfig>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    Advisory,
    GuardedAuto,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoiseControls {
    #[serde(rename = "dedupeWindowSeconds", default)]
    pub dedupe_window_seconds: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub mode: PolicyModeOrDefault,
    #[serde(default)]
    pub suppressions: BTreeMap<String, BTreeSet<String>>,
    #[serde(rename = "noiseControls", default)]
    pub noise_controls: NoiseControls,
    #[serde(default)]
    pub autonomous: Option<AutonomousPolicy>,
}

/// Wraps [`PolicyMode`] with a serde-friendly default so a registry that
/// omits `mode` loads as `advisory` rather than failing validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyModeOrDefault {
    Advisory,
    GuardedAuto,
}

impl Default for PolicyModeOrDefault {
    fn default() -> Self {
        Self::Advisory
    }
}

impl From<PolicyModeOrDefault> for PolicyMode {
    fn from(value: PolicyModeOrDefault) -> Self {
        match value {
            PolicyModeOrDefault::Advisory => PolicyMode::Advisory,
            PolicyModeOrDefault::GuardedAuto => PolicyMode::GuardedAuto,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetRegistry {
    #[serde(rename = "fleetId")]
    pub fleet_id: String,
    pub loops: Vec<LoopEntry>,
    pub policy: PolicyConfig,
}

impl FleetRegistry {
    pub fn mode(&self) -> PolicyMode {
        self.policy.mode.into()
    }
}

// ---- AutonomousPolicy ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Governance {
    pub actor: String,
    #[serde(rename = "approvalRef")]
    pub approval_ref: String,
    pub rationale: String,
    #[serde(rename = "changedAt")]
    pub changed_at: String,
    #[serde(rename = "reviewBy")]
    pub review_by: String,
    #[serde(rename = "authorityContext", default)]
    pub authority_context: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllowList {
    #[serde(default)]
    pub categories: BTreeSet<String>,
    #[serde(default)]
    pub intents: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceThreshold {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutonomyThresholds {
    #[serde(rename = "minSeverity")]
    pub min_severity: Severity,
    #[serde(rename = "minConfidence")]
    pub min_confidence: ConfidenceThreshold,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyConfig {
    #[serde(rename = "maxActionsPerRun")]
    pub max_actions_per_run: u32,
    #[serde(rename = "maxActionsPerLoop")]
    pub max_actions_per_loop: u32,
    #[serde(rename = "cooldownSeconds")]
    pub cooldown_seconds: u64,
    #[serde(rename = "killSwitch", default)]
    pub kill_switch: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RolloutScope {
    #[serde(rename = "loopIds", default)]
    pub loop_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RolloutSelector {
    #[serde(default)]
    pub salt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoPauseConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "lookbackExecutions", default)]
    pub lookback_executions: u32,
    #[serde(rename = "minSampleSize", default)]
    pub min_sample_size: u32,
    #[serde(rename = "ambiguityRateThreshold", default)]
    pub ambiguity_rate_threshold: f64,
    #[serde(rename = "failureRateThreshold", default)]
    pub failure_rate_threshold: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PauseConfig {
    #[serde(default)]
    pub manual: bool,
    #[serde(default)]
    pub auto: Option<AutoPauseConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RolloutConfig {
    #[serde(rename = "canaryPercent", default)]
    pub canary_percent: u8,
    #[serde(default)]
    pub scope: RolloutScope,
    #[serde(default)]
    pub selector: RolloutSelector,
    #[serde(default)]
    pub pause: PauseConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutonomousPolicy {
    pub governance: Governance,
    pub allow: AllowList,
    pub thresholds: AutonomyThresholds,
    pub safety: SafetyConfig,
    #[serde(default)]
    pub rollout: Option<RolloutConfig>,
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
