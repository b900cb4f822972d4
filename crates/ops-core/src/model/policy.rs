// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `PolicyCandidate` (spec §3, §4.6).

use serde::{Deserialize, Serialize};

use super::registry::Severity;
use super::projection::Confidence;

/// Fixed candidate category set (spec §4.6 step 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ReconcileFailed,
    HealthCritical,
    HealthDegraded,
    DivergenceDetected,
    OrderingDriftDetected,
    ControlAmbiguous,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::ReconcileFailed,
        Category::HealthCritical,
        Category::HealthDegraded,
        Category::DivergenceDetected,
        Category::OrderingDriftDetected,
        Category::ControlAmbiguous,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::ReconcileFailed => "reconcile_failed",
            Category::HealthCritical => "health_critical",
            Category::HealthDegraded => "health_degraded",
            Category::DivergenceDetected => "divergence_detected",
            Category::OrderingDriftDetected => "ordering_drift_detected",
            Category::ControlAmbiguous => "control_ambiguous",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.as_str() == s)
    }

    /// Severity derived deterministically from category (spec §4.6 step 1).
    pub fn default_severity(self) -> Severity {
        match self {
            Category::ReconcileFailed | Category::HealthCritical => Severity::Critical,
            _ => Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuppressionScope {
    Loop,
    Global,
    Cooldown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutonomyClassification {
    pub eligible: bool,
    #[serde(rename = "manualOnly")]
    pub manual_only: bool,
    pub reasons: Vec<String>,
    #[serde(default)]
    pub rollout: Option<RolloutClassification>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RolloutClassification {
    #[serde(rename = "inCohort")]
    pub in_cohort: bool,
    pub bucket: u8,
}

impl AutonomyClassification {
    pub fn eligible() -> Self {
        Self {
            eligible: true,
            manual_only: false,
            reasons: Vec::new(),
            rollout: None,
        }
    }

    pub fn manual_only(reasons: Vec<String>) -> Self {
        Self {
            eligible: false,
            manual_only: true,
            reasons,
            rollout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyCandidate {
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    #[serde(rename = "loopId")]
    pub loop_id: String,
    pub category: Category,
    pub severity: Severity,
    pub confidence: Confidence,
    pub rationale: String,
    #[serde(rename = "recommendedIntent")]
    pub recommended_intent: String,
    pub suppressed: bool,
    #[serde(rename = "suppressionScope")]
    pub suppression_scope: Option<SuppressionScope>,
    #[serde(rename = "suppressionReason")]
    pub suppression_reason: Option<String>,
    pub autonomous: AutonomyClassification,
}

impl PolicyCandidate {
    pub fn make_id(loop_id: &str, category: Category) -> String {
        format!("{loop_id}:{}", category.as_str())
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
