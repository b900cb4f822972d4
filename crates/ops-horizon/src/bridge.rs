// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Horizon→handoff bridge (spec §4.11). Claims envelope files out of
//! `horizons/bridge-inbox/` by rename (the only mutating filesystem step
//! besides the final processed/rejected move), validates the contract,
//! dedupes on `(packetId, traceId)`, and appends a pending
//! operator-confirmation intent to the claimed loop's handoff queue.
//!
//! `Recipient`'s `type` is a closed two-variant enum, so an envelope naming
//! any other recipient type already fails to deserialize — that is this
//! module's fail-closed handling of "unknown `recipient.type`", not a
//! separate check.

use std::collections::BTreeSet;
use std::path::Path;

use ops_core::clock::Clock;
use ops_core::error::{AppError, AppResult};
use ops_core::model::handoff::{HandoffIntent, HandoffStatus};
use ops_core::model::horizon::Recipient;
use ops_core::model::policy::AutonomyClassification;
use ops_core::model::registry::{FleetRegistry, TransportKind};
use ops_core::repo::Repo;
use ops_core::rollout;
use serde::{Deserialize, Serialize};

pub const CONTRACT_VALIDATION_FAILED: &str = "horizon_bridge_contract_validation_failed";
const BRIDGE_CATEGORY: &str = "horizon_bridge";
const MANUAL_ONLY_REASON: &str = "horizon_bridge_pending_confirmation";

#[derive(Debug, Clone, Deserialize)]
struct BridgeEnvelope {
    #[serde(rename = "packetId")]
    packet_id: Option<String>,
    #[serde(rename = "traceId")]
    trace_id: Option<String>,
    intent: Option<String>,
    recipient: Option<Recipient>,
}

struct ValidatedEnvelope {
    packet_id: String,
    trace_id: String,
    intent: String,
    recipient: Recipient,
}

fn validate(raw: &serde_json::Value) -> AppResult<ValidatedEnvelope> {
    let envelope: BridgeEnvelope =
        serde_json::from_value(raw.clone()).map_err(|_| AppError::contract(CONTRACT_VALIDATION_FAILED))?;
    match (envelope.packet_id, envelope.trace_id, envelope.intent, envelope.recipient) {
        (Some(packet_id), Some(trace_id), Some(intent), Some(recipient)) => {
            Ok(ValidatedEnvelope { packet_id, trace_id, intent, recipient })
        }
        _ => Err(AppError::contract(CONTRACT_VALIDATION_FAILED)),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BridgeState {
    #[serde(default)]
    processed_keys: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BridgeRecord {
    packet_id: String,
    trace_id: String,
    intent_id: String,
    loop_id: String,
    timestamp: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BridgeQueueState {
    #[serde(default)]
    records: Vec<BridgeRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestOutcome {
    Ingested,
    DuplicateIgnored,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResult {
    pub packet_id: String,
    pub outcome: IngestOutcome,
}

fn dispatch_key(packet_id: &str, trace_id: &str) -> String {
    format!("{packet_id}:{trace_id}")
}

fn resolve_transport(registry: Option<&FleetRegistry>, loop_id: &str) -> TransportKind {
    registry
        .and_then(|registry| registry.loops.iter().find(|entry| entry.loop_id == loop_id))
        .map(|entry| entry.transport)
        .unwrap_or(TransportKind::Local)
}

/// Claim and process one envelope file. On a contract violation the claim
/// moves to `rejected/` and this returns `Err` carrying
/// [`CONTRACT_VALIDATION_FAILED`] for the CLI to map to its non-zero exit.
pub fn ingest_one<C: Clock>(
    repo: &Repo,
    clock: &C,
    registry: Option<&FleetRegistry>,
    inbox_path: &Path,
) -> AppResult<IngestResult> {
    let file_name = inbox_path
        .file_name()
        .ok_or_else(|| AppError::validation("inbox_path", "envelope path has no file name"))?
        .to_owned();

    let claimed_path = repo.fleet_horizon_bridge_claims_dir("claimed").join(&file_name);
    Repo::ensure_parent_dir(&claimed_path).map_err(|e| AppError::io(&claimed_path, e))?;
    std::fs::rename(inbox_path, &claimed_path).map_err(|e| AppError::io(&claimed_path, e))?;

    let raw: serde_json::Value = match ops_storage::atomic_json::read_json(&claimed_path) {
        Ok(Some(value)) => value,
        _ => {
            reject(repo, &claimed_path, &file_name)?;
            return Err(AppError::contract(CONTRACT_VALIDATION_FAILED));
        }
    };

    let envelope = match validate(&raw) {
        Ok(envelope) => envelope,
        Err(err) => {
            reject(repo, &claimed_path, &file_name)?;
            return Err(err);
        }
    };

    let state_path = repo.fleet_horizon_bridge_state_json();
    let mut state: BridgeState = ops_storage::atomic_json::read_json(&state_path)?.unwrap_or_default();
    let key = dispatch_key(&envelope.packet_id, &envelope.trace_id);

    if state.processed_keys.contains(&key) {
        finish(repo, &claimed_path, &file_name, "processed")?;
        return Ok(IngestResult { packet_id: envelope.packet_id, outcome: IngestOutcome::DuplicateIgnored });
    }

    let loop_id = envelope.recipient.id.clone();
    let intent_id = format!("horizon-bridge:{}", envelope.packet_id);
    let idempotency_key = format!("horizon-bridge-{}-{}", envelope.trace_id, rollout::stable_hash(&envelope.packet_id));

    let handoff_intent = HandoffIntent {
        intent_id: intent_id.clone(),
        loop_id: loop_id.clone(),
        category: BRIDGE_CATEGORY.to_string(),
        intent: envelope.intent,
        status: HandoffStatus::PendingOperatorConfirmation,
        autonomous: AutonomyClassification::manual_only(vec![MANUAL_ONLY_REASON.to_string()]),
        idempotency_key,
        transport: resolve_transport(registry, &loop_id),
        reason_codes: Vec::new(),
    };

    ops_storage::jsonl::append_line(&repo.ops_loop_intents_jsonl(&loop_id), &handoff_intent)?;

    state.processed_keys.insert(key);
    ops_storage::atomic_json::write_json_atomic(&state_path, &state)?;

    let timestamp = clock.now_rfc3339();
    let queue_path = repo.fleet_horizon_bridge_queue_json();
    let mut queue: BridgeQueueState = ops_storage::atomic_json::read_json(&queue_path)?.unwrap_or_default();
    queue.records.push(BridgeRecord {
        packet_id: envelope.packet_id.clone(),
        trace_id: envelope.trace_id.clone(),
        intent_id,
        loop_id,
        timestamp: timestamp.clone(),
    });
    ops_storage::atomic_json::write_json_atomic(&queue_path, &queue)?;

    ops_storage::jsonl::append_line(
        &repo.fleet_telemetry("horizon-bridge"),
        &serde_json::json!({
            "packetId": envelope.packet_id,
            "traceId": envelope.trace_id,
            "timestamp": timestamp,
        }),
    )?;

    finish(repo, &claimed_path, &file_name, "processed")?;

    Ok(IngestResult { packet_id: envelope.packet_id, outcome: IngestOutcome::Ingested })
}

fn reject(repo: &Repo, claimed_path: &Path, file_name: &std::ffi::OsStr) -> AppResult<()> {
    finish(repo, claimed_path, file_name, "rejected")
}

fn finish(repo: &Repo, claimed_path: &Path, file_name: &std::ffi::OsStr, outcome: &str) -> AppResult<()> {
    let final_path = repo.fleet_horizon_bridge_claims_dir(outcome).join(file_name);
    Repo::ensure_parent_dir(&final_path).map_err(|e| AppError::io(&final_path, e))?;
    std::fs::rename(claimed_path, &final_path).map_err(|e| AppError::io(&final_path, e))?;
    Ok(())
}

/// Process every file currently sitting in the inbox, in directory-listing
/// order. A single contract failure does not stop the sweep; its error is
/// carried in the result so the CLI can still report the non-zero exit
/// after the rest of the batch lands.
pub fn ingest_all<C: Clock>(repo: &Repo, clock: &C, registry: Option<&FleetRegistry>) -> AppResult<Vec<AppResult<IngestResult>>> {
    let inbox_dir = repo.horizon_bridge_inbox_dir();
    let entries = match std::fs::read_dir(&inbox_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(AppError::io(&inbox_dir, e)),
    };

    let mut results = Vec::new();
    for entry in entries {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        results.push(ingest_one(repo, clock, registry, &path));
    }
    Ok(results)
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
