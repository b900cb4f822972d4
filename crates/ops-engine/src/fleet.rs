// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet reconciler (spec §4.5): validate the registry, fan out per-loop
//! reconciles behind a bounded semaphore, and roll the results up into a
//! single `state.json` with results emitted in sort order regardless of
//! completion order.

use ops_core::clock::Clock;
use ops_core::config::ReconcilerConfig;
use ops_core::error::{AppError, AppResult};
use ops_core::model::health::HealthStatus;
use ops_core::model::registry::{FleetRegistry, LoopEntry, TransportKind};
use ops_core::repo::Repo;
use ops_transport::{build_transport, Transport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::reconciler::Reconciler;

/// The fixed suppression-category set (spec §4.6 step 1); a registry
/// naming anything outside it is rejected at validation.
pub const SUPPRESSION_CATEGORIES: &[&str] = &[
    "reconcile_failed",
    "health_critical",
    "health_degraded",
    "divergence_detected",
    "ordering_drift_detected",
    "control_ambiguous",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FleetStatus {
    Success,
    PartialFailure,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetLoopResult {
    pub loop_id: String,
    pub status: String,
    pub health_status: Option<HealthStatus>,
    pub reason_code: Option<String>,
    pub trace_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetExecution {
    pub trace_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetState {
    pub status: FleetStatus,
    pub results: Vec<FleetLoopResult>,
    pub reason_codes: BTreeSet<String>,
    pub execution: FleetExecution,
}

pub struct FleetReconcileInput<'a> {
    pub registry: &'a FleetRegistry,
    pub trace_id: &'a str,
    pub deterministic_order: bool,
    pub max_parallel: usize,
    pub config: &'a ReconcilerConfig,
}

/// Reject a registry with a `sprite_service` loop missing `service.baseUrl`
/// or any suppression scope naming a category outside the closed set.
pub fn validate_registry(registry: &FleetRegistry) -> AppResult<()> {
    for entry in &registry.loops {
        if entry.transport == TransportKind::SpriteService {
            let has_base_url = entry.service.as_ref().and_then(|s| s.base_url.as_ref()).is_some();
            if !has_base_url {
                return Err(AppError::validation(
                    "loops[].service.baseUrl",
                    format!("loop '{}' uses sprite_service transport without a baseUrl", entry.loop_id),
                ));
            }
        }
    }
    for (scope, categories) in &registry.policy.suppressions {
        for category in categories {
            if !SUPPRESSION_CATEGORIES.contains(&category.as_str()) {
                return Err(AppError::validation(
                    "policy.suppressions",
                    format!("unknown suppression category '{category}' in scope '{scope}'"),
                ));
            }
        }
    }
    Ok(())
}

fn reason_code_name(code: &ops_core::model::health::ReasonCode) -> Option<String> {
    match serde_json::to_value(code) {
        Ok(serde_json::Value::String(name)) => Some(name),
        _ => None,
    }
}

pub async fn reconcile_fleet<C: Clock>(repo: &Repo, clock: C, input: FleetReconcileInput<'_>) -> AppResult<FleetState> {
    validate_registry(input.registry)?;

    let mut entries: Vec<LoopEntry> = input
        .registry
        .loops
        .iter()
        .filter(|entry| entry.enabled)
        .cloned()
        .collect();
    if input.deterministic_order {
        entries.sort_by(|a, b| a.loop_id.cmp(&b.loop_id));
    }

    let semaphore = Arc::new(Semaphore::new(input.max_parallel.max(1)));
    let reconciler = Arc::new(Reconciler::new(repo.clone(), clock));

    // One join handle per loop, submitted in (sorted) order; the semaphore
    // inside each task bounds how many run concurrently, while awaiting
    // the handles back in this same order is what keeps `results` stable
    // under `deterministicOrder` regardless of completion order.
    let mut pending = Vec::with_capacity(entries.len());
    for entry in &entries {
        let transport = build_transport(repo, entry)?;
        let semaphore = semaphore.clone();
        let reconciler = reconciler.clone();
        let loop_id = entry.loop_id.clone();
        let loop_trace_id = ops_core::id::derive_loop_trace_id(input.trace_id, &loop_id);
        let config = input.config.clone();
        let task_loop_id = loop_id.clone();
        let task_trace_id = loop_trace_id.clone();

        let handle = tokio::spawn(async move {
            match semaphore.acquire_owned().await {
                Ok(_permit) => reconciler.reconcile(transport.as_ref(), &task_loop_id, &task_trace_id, &config).await,
                Err(_) => Err(AppError::transport("fleet semaphore closed unexpectedly")),
            }
        });
        pending.push((loop_id, loop_trace_id, handle));
    }

    let mut results = Vec::with_capacity(pending.len());
    let mut reason_codes = BTreeSet::new();

    for (loop_id, loop_trace_id, handle) in pending {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(_join_err) => Err(AppError::transport("reconcile task terminated unexpectedly")),
        };
        let result = match outcome {
            Ok(outcome) => {
                if let Some(reason) = &outcome.reason_code {
                    reason_codes.insert(reason.clone());
                }
                for code in &outcome.health.reason_codes {
                    if let Some(name) = reason_code_name(code) {
                        reason_codes.insert(name);
                    }
                }
                FleetLoopResult {
                    loop_id,
                    status: if outcome.succeeded { "success".into() } else { "failed".into() },
                    health_status: Some(outcome.health.status),
                    reason_code: outcome.reason_code,
                    trace_id: loop_trace_id,
                }
            }
            Err(err) => {
                reason_codes.insert("reconcile_failed".into());
                FleetLoopResult {
                    loop_id,
                    status: "failed".into(),
                    health_status: None,
                    reason_code: Some(err.to_string()),
                    trace_id: loop_trace_id,
                }
            }
        };
        results.push(result);
    }

    let failed_count = results.iter().filter(|r| r.status == "failed").count();
    let status = if results.is_empty() || failed_count == 0 {
        FleetStatus::Success
    } else if failed_count == results.len() {
        FleetStatus::Failed
    } else {
        reason_codes.insert("fleet_partial_failure".into());
        FleetStatus::PartialFailure
    };

    let state = FleetState {
        status,
        results,
        reason_codes,
        execution: FleetExecution {
            trace_id: input.trace_id.to_string(),
        },
    };
    ops_storage::atomic_json::write_json_atomic(&repo.fleet_state_json(), &state)?;
    Ok(state)
}

#[cfg(test)]
#[path = "fleet_tests.rs"]
mod tests;
