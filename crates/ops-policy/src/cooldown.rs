// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cooldown dedupe (spec §4.6 step 3): a candidate that fired within
//! `dedupeWindowSeconds` of its last firing is suppressed again with
//! `suppressionScope=cooldown`. The same firing history also backs the
//! stricter, autonomy-only `safety.cooldownSeconds` check (step 4e).

use ops_core::error::AppResult;
use ops_core::model::policy::{PolicyCandidate, SuppressionScope};
use ops_core::repo::Repo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const ADVISORY_COOLDOWN_ACTIVE: &str = "advisory_cooldown_active";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyHistoryRow {
    candidate_id: String,
    loop_id: String,
    category: String,
    fired_at_ms: u64,
    trace_id: String,
}

fn history_path(repo: &Repo) -> std::path::PathBuf {
    repo.fleet_telemetry("policy-history")
}

/// Most recent firing timestamp (epoch ms) per `candidateId`, scanning the
/// whole history. Last-write-wins per candidate.
pub fn read_last_fired(repo: &Repo) -> AppResult<BTreeMap<String, u64>> {
    let rows: Vec<(u64, PolicyHistoryRow)> = ops_storage::jsonl::read_since_typed(&history_path(repo), 0)?;
    let mut out = BTreeMap::new();
    for (_, row) in rows {
        out.insert(row.candidate_id, row.fired_at_ms);
    }
    Ok(out)
}

/// Mark candidates suppressed by cooldown in place. Only examines
/// candidates not already suppressed by [`crate::suppression`] — a
/// loop/global suppression already explains why the candidate didn't fire.
pub fn apply(candidates: &mut [PolicyCandidate], last_fired: &BTreeMap<String, u64>, now_ms: u64, dedupe_window_seconds: u64) {
    let window_ms = dedupe_window_seconds.saturating_mul(1000);
    for candidate in candidates {
        if candidate.suppressed {
            continue;
        }
        if let Some(&fired_at_ms) = last_fired.get(&candidate.candidate_id) {
            if now_ms.saturating_sub(fired_at_ms) < window_ms {
                candidate.suppressed = true;
                candidate.suppression_scope = Some(SuppressionScope::Cooldown);
                candidate.suppression_reason = Some(ADVISORY_COOLDOWN_ACTIVE.to_string());
            }
        }
    }
}

/// Append one history row per candidate that is not suppressed after the
/// full pipeline ran — it genuinely fired this pass.
pub fn record_firings(repo: &Repo, candidates: &[PolicyCandidate], now_ms: u64, trace_id: &str) -> AppResult<()> {
    for candidate in candidates {
        if candidate.suppressed {
            continue;
        }
        let row = PolicyHistoryRow {
            candidate_id: candidate.candidate_id.clone(),
            loop_id: candidate.loop_id.clone(),
            category: candidate.category.as_str().to_string(),
            fired_at_ms: now_ms,
            trace_id: trace_id.to_string(),
        };
        ops_storage::jsonl::append_line(&history_path(repo), &row)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "cooldown_tests.rs"]
mod tests;
