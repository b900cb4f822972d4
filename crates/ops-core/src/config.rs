// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ambient TOML configuration: threshold profile selection, retry/backoff
//! policy objects, and the alert sink table (spec §4.8). Loaded the way
//! the teacher loads its runbook/HCL configuration — `serde(default)`
//! throughout so a partial config file is legal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{AppError, AppResult};
use crate::model::health::ThresholdProfile;
use crate::retry::BackoffPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    #[serde(default = "default_profile")]
    pub threshold_profile: ThresholdProfile,
    #[serde(default)]
    pub snapshot_timeout_seconds: Option<u64>,
    #[serde(default)]
    pub events_timeout_seconds: Option<u64>,
    #[serde(default)]
    pub control_timeout_seconds: Option<u64>,
}

fn default_profile() -> ThresholdProfile {
    ThresholdProfile::Balanced
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            threshold_profile: default_profile(),
            snapshot_timeout_seconds: None,
            events_timeout_seconds: None,
            control_timeout_seconds: None,
        }
    }
}

impl ReconcilerConfig {
    pub fn snapshot_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.snapshot_timeout_seconds.unwrap_or(5))
    }

    pub fn events_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.events_timeout_seconds.unwrap_or(5))
    }

    pub fn control_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.control_timeout_seconds.unwrap_or(30))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    Slack,
    Webhook,
    Pagerduty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSink {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "type")]
    pub sink_type: SinkType,
    #[serde(rename = "urlEnv", default)]
    pub url_env: Option<String>,
    #[serde(rename = "tokenEnv", default)]
    pub token_env: Option<String>,
    #[serde(rename = "timeoutSeconds", default = "default_sink_timeout")]
    pub timeout_seconds: u64,
    #[serde(rename = "minSeverity", default)]
    pub min_severity: Option<MinSeverity>,
}

fn default_sink_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertSinksConfig {
    #[serde(default)]
    pub sinks: Vec<AlertSink>,
    /// Severity floor resolved first by category, then by route (spec
    /// §4.8): `categories["health_critical"]`, falling back to the route
    /// default if absent.
    #[serde(default)]
    pub categories: BTreeMap<String, MinSeverity>,
}

impl AlertSinksConfig {
    pub fn load(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
        toml::from_str(&text).map_err(AppError::from)
    }

    pub fn effective_min_severity(&self, category: &str, route_default: MinSeverity) -> MinSeverity {
        self.categories.get(category).copied().unwrap_or(route_default)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizonConfig {
    #[serde(rename = "ackTimeoutSeconds", default = "default_ack_timeout")]
    pub ack_timeout_seconds: u64,
    #[serde(rename = "maxRetries", default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(rename = "retryBackoffSeconds", default = "default_retry_backoff")]
    pub retry_backoff_seconds: u64,
    #[serde(rename = "directoryMode", default)]
    pub directory_mode: DirectoryMode,
}

fn default_ack_timeout() -> u64 {
    120
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_backoff() -> u64 {
    30
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryMode {
    #[default]
    Optional,
    Required,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            ack_timeout_seconds: default_ack_timeout(),
            max_retries: default_max_retries(),
            retry_backoff_seconds: default_retry_backoff(),
            directory_mode: DirectoryMode::default(),
        }
    }
}

impl HorizonConfig {
    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::new(self.retry_backoff_seconds, self.retry_backoff_seconds * 8, self.max_retries)
    }
}

/// Outcome-reliability gate thresholds (spec §4.9 gate group 2).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OutcomeReliabilityConfig {
    #[serde(rename = "lookbackExecutions", default = "default_lookback")]
    pub lookback_executions: u32,
    #[serde(rename = "minSampleSize", default = "default_min_sample_size")]
    pub min_sample_size: u32,
    #[serde(rename = "maxAmbiguityRate", default = "default_max_rate")]
    pub max_ambiguity_rate: f64,
    #[serde(rename = "maxFailureRate", default = "default_max_rate")]
    pub max_failure_rate: f64,
}

fn default_lookback() -> u32 {
    50
}
fn default_min_sample_size() -> u32 {
    10
}
fn default_max_rate() -> f64 {
    0.1
}

impl Default for OutcomeReliabilityConfig {
    fn default() -> Self {
        Self {
            lookback_executions: default_lookback(),
            min_sample_size: default_min_sample_size(),
            max_ambiguity_rate: default_max_rate(),
            max_failure_rate: default_max_rate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionConfig {
    #[serde(rename = "outcomeReliability", default)]
    pub outcome_reliability: OutcomeReliabilityConfig,
    #[serde(rename = "maxDrillAgeHours", default = "default_max_drill_age_hours")]
    pub max_drill_age_hours: u64,
    #[serde(rename = "requireAuthorityContext", default)]
    pub require_authority_context: bool,
}

fn default_max_drill_age_hours() -> u64 {
    24 * 30
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            outcome_reliability: OutcomeReliabilityConfig::default(),
            max_drill_age_hours: default_max_drill_age_hours(),
            require_authority_context: false,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
