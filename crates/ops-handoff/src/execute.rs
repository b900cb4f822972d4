// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execute modes (spec §4.7): manual (`--execute --confirm`, explicitly
//! named intents only) and autonomous (`--autonomous-execute`, eligible
//! candidates only, `guarded_auto` mode only). Both dispatch through
//! [`ops_transport::Transport::control`] and append a row to
//! `fleet/telemetry/handoff.jsonl` — the same stream `ops_policy::autonomy`
//! samples for rollout auto-pause.

use std::collections::BTreeMap;
use std::sync::Arc;

use ops_core::clock::Clock;
use ops_core::error::AppResult;
use ops_core::model::handoff::{HandoffIntent, HandoffStatus};
use ops_core::model::registry::FleetRegistry;
use ops_core::repo::Repo;
use ops_transport::{build_transport, ControlOutcome, ControlRequest, Transport};
use serde::{Deserialize, Serialize};

pub const RETRY_GUARD_AMBIGUOUS: &str = "autonomous_retry_guard_ambiguous";
pub const RETRY_GUARDED: &str = "fleet_handoff_retry_guarded";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffTelemetryRow {
    pub intent_id: String,
    pub loop_id: String,
    pub category: String,
    pub intent: String,
    pub status: HandoffStatus,
    pub trace_id: String,
    pub timestamp: String,
}

fn retry_guard_key(intent: &HandoffIntent) -> String {
    format!("{}:{}:{}", intent.loop_id, intent.category, intent.intent)
}

/// Most recent status per `(loopId, category, intent)`, last-write-wins
/// over `fleet/telemetry/handoff.jsonl`. A manual re-dispatch naturally
/// clears the guard the moment it appends a non-ambiguous row for the
/// same key, since only the latest row per key is consulted — spec §4.7's
/// "no operator intervention intervened" is read as "the latest recorded
/// outcome for this key is still ambiguous".
pub fn read_last_status(repo: &Repo) -> AppResult<BTreeMap<String, HandoffStatus>> {
    let rows: Vec<(u64, HandoffTelemetryRow)> =
        ops_storage::jsonl::read_since_typed(&repo.fleet_telemetry("handoff"), 0)?;
    let mut out = BTreeMap::new();
    for (_, row) in rows {
        out.insert(format!("{}:{}:{}", row.loop_id, row.category, row.intent), row.status);
    }
    Ok(out)
}

/// Demote any intent whose retry-guard key last ended `execution_ambiguous`,
/// in place. Only applies to the autonomous execute path (manual dispatch
/// is an explicit operator action and is never guarded). Runs regardless
/// of the intent's current eligibility — `ops_policy::engine::run_policy_pass`
/// applies this same guard to the candidate the intent was planned from,
/// so an already-demoted intent must still pick up `RETRY_GUARDED` here
/// rather than being skipped, or the handoff-level record of *why* would
/// go missing.
pub fn apply_retry_guard(intents: &mut [HandoffIntent], last_status: &BTreeMap<String, HandoffStatus>) {
    for intent in intents {
        if last_status.get(&retry_guard_key(intent)) == Some(&HandoffStatus::ExecutionAmbiguous) {
            intent.autonomous.eligible = false;
            intent.autonomous.manual_only = true;
            if !intent.autonomous.reasons.iter().any(|r| r == RETRY_GUARD_AMBIGUOUS) {
                intent.autonomous.reasons.push(RETRY_GUARD_AMBIGUOUS.to_string());
            }
            if !intent.reason_codes.iter().any(|r| r == RETRY_GUARDED) {
                intent.reason_codes.push(RETRY_GUARDED.to_string());
            }
        }
    }
}

fn status_for(outcome: &ControlOutcome) -> HandoffStatus {
    match outcome.reason_code.as_str() {
        ops_transport::control::CONTROL_CONFIRMED => HandoffStatus::Executed,
        ops_transport::control::CONTROL_AMBIGUOUS => HandoffStatus::ExecutionAmbiguous,
        _ => HandoffStatus::ExecutionFailed,
    }
}

async fn dispatch_one<C: Clock>(
    repo: &Repo,
    clock: &C,
    transport: Arc<dyn Transport>,
    intent: &mut HandoffIntent,
    trace_id: &str,
) -> AppResult<()> {
    let request = ControlRequest {
        loop_id: intent.loop_id.clone(),
        intent: intent.intent.clone(),
        idempotency_key: intent.idempotency_key.clone(),
        trace_id: trace_id.to_string(),
        payload: serde_json::Value::Null,
    };

    let outcome = match transport.control(request).await {
        Ok(outcome) => outcome,
        Err(_) => ControlOutcome::failed_command(trace_id),
    };

    intent.status = status_for(&outcome);

    ops_storage::jsonl::append_line(
        &repo.fleet_telemetry("handoff"),
        &HandoffTelemetryRow {
            intent_id: intent.intent_id.clone(),
            loop_id: intent.loop_id.clone(),
            category: intent.category.clone(),
            intent: intent.intent.clone(),
            status: intent.status,
            trace_id: trace_id.to_string(),
            timestamp: clock.now_rfc3339(),
        },
    )?;
    Ok(())
}

/// Dispatch the explicitly named intents (manual mode). Every named
/// intent ID must be present in `intents`, else this is a usage error the
/// caller should reject before calling in (spec §4.7: "requires both
/// flags, rejects otherwise with a hard error" is the CLI-level gate;
/// this function assumes that gate already passed).
pub async fn dispatch_manual<C: Clock>(
    repo: &Repo,
    clock: &C,
    registry: &FleetRegistry,
    intents: &mut [HandoffIntent],
    intent_ids: &[String],
    trace_id: &str,
) -> AppResult<()> {
    for intent in intents.iter_mut() {
        if !intent_ids.iter().any(|id| id == &intent.intent_id) {
            continue;
        }
        let entry = registry.loops.iter().find(|e| e.loop_id == intent.loop_id);
        let Some(entry) = entry else { continue };
        let transport = build_transport(repo, entry)?;
        dispatch_one(repo, clock, transport, intent, trace_id).await?;
    }
    Ok(())
}

/// Dispatch every `autonomous.eligible` intent (autonomous mode). Caller
/// must have already confirmed `registry.mode() == PolicyMode::GuardedAuto`
/// and applied [`apply_retry_guard`].
pub async fn dispatch_autonomous<C: Clock>(
    repo: &Repo,
    clock: &C,
    registry: &FleetRegistry,
    intents: &mut [HandoffIntent],
    trace_id: &str,
) -> AppResult<()> {
    for intent in intents.iter_mut() {
        if !intent.autonomous.eligible {
            continue;
        }
        let entry = registry.loops.iter().find(|e| e.loop_id == intent.loop_id);
        let Some(entry) = entry else { continue };
        let transport = build_transport(repo, entry)?;
        dispatch_one(repo, clock, transport, intent, trace_id).await?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "execute_tests.rs"]
mod tests;
