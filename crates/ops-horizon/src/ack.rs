// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ACK ingest (spec §4.10): dedupe on `{packetId, traceId}`, persisted to
//! `ack-state.json.processedKeys`. A duplicate receipt counts against the
//! key's `duplicateCount` but never re-transitions the packet.

use std::collections::{BTreeMap, BTreeSet};

use ops_core::clock::Clock;
use ops_core::model::horizon::PacketStatus;
use ops_core::error::AppResult;
use ops_core::repo::Repo;
use serde::{Deserialize, Serialize};

use crate::packet;

#[derive(Debug, Clone)]
pub struct AckReceipt {
    pub packet_id: String,
    pub trace_id: String,
    pub to: PacketStatus,
    pub note: Option<String>,
}

fn receipt_key(receipt: &AckReceipt) -> String {
    format!("{}:{}", receipt.packet_id, receipt.trace_id)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckState {
    #[serde(default)]
    pub processed_keys: BTreeSet<String>,
    #[serde(default)]
    pub duplicate_counts: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckIngestStatus {
    Processed,
    Duplicate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckOutcome {
    pub status: AckIngestStatus,
    pub duplicate_count: u64,
}

pub fn ingest<C: Clock>(repo: &Repo, clock: &C, receipt: AckReceipt) -> AppResult<AckOutcome> {
    let state_path = repo.horizon_ack_state_json();
    let mut state: AckState = ops_storage::atomic_json::read_json(&state_path)?.unwrap_or_default();
    let key = receipt_key(&receipt);

    if state.processed_keys.contains(&key) {
        let count = state.duplicate_counts.entry(key).or_insert(0);
        *count += 1;
        let duplicate_count = *count;
        ops_storage::atomic_json::write_json_atomic(&state_path, &state)?;
        return Ok(AckOutcome { status: AckIngestStatus::Duplicate, duplicate_count });
    }

    packet::transition_packet(repo, clock, &receipt.packet_id, receipt.to, receipt.note)?;

    state.processed_keys.insert(key);
    ops_storage::atomic_json::write_json_atomic(&state_path, &state)?;

    Ok(AckOutcome { status: AckIngestStatus::Processed, duplicate_count: 0 })
}

#[cfg(test)]
#[path = "ack_tests.rs"]
mod tests;
