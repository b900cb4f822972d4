// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sink secret resolution and delivery (spec §4.8). Mirrors
//! `ops_transport::sprite_service`'s classify-by-response-status shape for
//! the one HTTP call a sink dispatch makes.

use std::time::Duration;

use ops_core::config::{AlertSink, AlertSinksConfig, MinSeverity};
use ops_core::error::{AppError, AppResult};
use ops_core::model::registry::Severity;
use ops_core::model::policy::Category;
use reqwest::Client;
use serde_json::json;

fn category_min_severity(category: &str) -> MinSeverity {
    match Category::from_str_opt(category).map(Category::default_severity) {
        Some(Severity::Critical) => MinSeverity::Critical,
        Some(Severity::Warning) => MinSeverity::Warning,
        None => MinSeverity::Info,
    }
}

/// Resolved value of a sink's secret-bearing env var, or `None` if unset
/// or empty.
fn resolve_secret(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.is_empty())
}

/// Fail-closed precondition (spec §4.8): every *enabled* sink's
/// `urlEnv`/`tokenEnv` must resolve to a non-empty value, or the whole
/// dispatch invocation is rejected before any sink is touched.
pub fn validate_secrets(config: &AlertSinksConfig) -> AppResult<()> {
    for sink in &config.sinks {
        if !sink.enabled {
            continue;
        }
        if let Some(var) = &sink.url_env {
            if resolve_secret(var).is_none() {
                return Err(AppError::validation(
                    "sinks[].urlEnv",
                    format!("sink '{}' has urlEnv '{var}' unset", sink.name),
                ));
            }
        }
        if let Some(var) = &sink.token_env {
            if resolve_secret(var).is_none() {
                return Err(AppError::validation(
                    "sinks[].tokenEnv",
                    format!("sink '{}' has tokenEnv '{var}' unset", sink.name),
                ));
            }
        }
    }
    Ok(())
}

/// Whether `category`'s severity clears the floor resolved for this sink
/// (category override, falling back to the sink's own `minSeverity`).
pub fn passes_severity_floor(config: &AlertSinksConfig, sink: &AlertSink, category: &str) -> bool {
    let route_default = sink.min_severity.unwrap_or(MinSeverity::Info);
    let floor = config.effective_min_severity(category, route_default);
    category_min_severity(category) >= floor
}

/// Deliver one escalation to one sink over HTTP. Any non-2xx response or
/// network error is a delivery failure local to this sink, distinct from
/// the fail-closed config-validation error above.
pub async fn deliver(client: &Client, sink: &AlertSink, body: serde_json::Value) -> AppResult<()> {
    let url = sink
        .url_env
        .as_ref()
        .and_then(|var| resolve_secret(var))
        .ok_or_else(|| AppError::validation("sinks[].urlEnv", format!("sink '{}' has no resolvable url", sink.name)))?;

    let mut request = client
        .post(&url)
        .timeout(Duration::from_secs(sink.timeout_seconds))
        .json(&body);

    if let Some(var) = &sink.token_env {
        if let Some(token) = resolve_secret(var) {
            request = request.bearer_auth(token);
        }
    }

    let response = request
        .send()
        .await
        .map_err(|e| AppError::transport(format!("sink '{}' delivery failed: {e}", sink.name)))?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(AppError::transport(format!(
            "sink '{}' returned {}",
            sink.name,
            response.status()
        )))
    }
}

pub fn dispatch_body(loop_id: &str, category: &str, trace_id: &str, timestamp: &str) -> serde_json::Value {
    json!({
        "loopId": loop_id,
        "category": category,
        "traceId": trace_id,
        "timestamp": timestamp,
    })
}

#[cfg(test)]
#[path = "sinks_tests.rs"]
mod tests;
