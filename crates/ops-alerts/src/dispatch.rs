// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-loop alert dispatch orchestrator (spec §4.8): read new escalation
//! lines since a stored offset, route through sinks with severity
//! gating, and append `alerts.jsonl` — exactly once per escalation line.

use ops_core::config::AlertSinksConfig;
use ops_core::error::AppResult;
use ops_core::repo::Repo;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::sinks;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Dispatched,
    NoNewEscalations,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlertDispatchState {
    last_offset: u64,
}

/// Narrow read-side view of `ops-engine::reconciler::EscalationRow`;
/// deserialization ignores the fields this crate doesn't need.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EscalationRow {
    category: String,
    loop_id: String,
    trace_id: String,
    timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlertRow {
    loop_id: String,
    category: String,
    sink: String,
    delivered: bool,
    trace_id: String,
    timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub status: DispatchStatus,
    pub dispatched_count: usize,
}

/// Dispatch every escalation appended since the last run for one loop.
/// Fails closed before touching any sink if an enabled sink's secret env
/// var is unset (spec §4.8): the whole invocation aborts and the offset
/// is not advanced.
pub async fn dispatch_for_loop(repo: &Repo, config: &AlertSinksConfig, loop_id: &str) -> AppResult<DispatchOutcome> {
    sinks::validate_secrets(config)?;

    let state_path = repo.ops_loop_alert_dispatch_state_json(loop_id);
    let state: AlertDispatchState = ops_storage::atomic_json::read_json(&state_path)?.unwrap_or_default();

    let rows: Vec<(u64, EscalationRow)> =
        ops_storage::jsonl::read_since_typed(&repo.ops_loop_escalations_jsonl(loop_id), state.last_offset)?;

    if rows.is_empty() {
        return Ok(DispatchOutcome { status: DispatchStatus::NoNewEscalations, dispatched_count: 0 });
    }

    let client = Client::new();
    let mut dispatched_count = 0;
    let mut max_offset = state.last_offset;

    for (offset, escalation) in &rows {
        max_offset = max_offset.max(*offset);
        let body = sinks::dispatch_body(&escalation.loop_id, &escalation.category, &escalation.trace_id, &escalation.timestamp);

        for sink in &config.sinks {
            if !sink.enabled || !sinks::passes_severity_floor(config, sink, &escalation.category) {
                continue;
            }
            let delivered = sinks::deliver(&client, sink, body.clone()).await.is_ok();
            if delivered {
                dispatched_count += 1;
            }
            ops_storage::jsonl::append_line(
                &repo.ops_loop_telemetry(loop_id, "alerts"),
                &AlertRow {
                    loop_id: escalation.loop_id.clone(),
                    category: escalation.category.clone(),
                    sink: sink.name.clone(),
                    delivered,
                    trace_id: escalation.trace_id.clone(),
                    timestamp: escalation.timestamp.clone(),
                },
            )?;
        }
    }

    ops_storage::atomic_json::write_json_atomic(&state_path, &AlertDispatchState { last_offset: max_offset })?;

    Ok(DispatchOutcome { status: DispatchStatus::Dispatched, dispatched_count })
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
