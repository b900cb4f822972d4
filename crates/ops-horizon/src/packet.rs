// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Packet lifecycle operations (spec §4.10): `create`, `transition`,
//! `list`, `show`. The FSM itself lives on
//! [`ops_core::model::horizon::HorizonPacket`]; this module is the
//! persistence and query layer around it.

use ops_core::clock::Clock;
use ops_core::error::{AppError, AppResult};
use ops_core::id::IdGen;
use ops_core::model::horizon::{HorizonPacket, PacketStatus, Recipient};
use ops_core::repo::Repo;

pub struct CreatePacketRequest {
    pub horizon_ref: String,
    pub sender: String,
    pub recipient: Recipient,
    pub intent: String,
    pub ttl_seconds: Option<u64>,
    pub evidence_refs: Vec<String>,
}

pub fn create_packet<C: Clock, G: IdGen>(repo: &Repo, clock: &C, id_gen: &G, request: CreatePacketRequest) -> AppResult<HorizonPacket> {
    let now = clock.now_rfc3339();
    let packet = HorizonPacket {
        packet_id: id_gen.new_id(),
        trace_id: id_gen.new_id(),
        horizon_ref: request.horizon_ref,
        sender: request.sender,
        recipient: request.recipient,
        intent: request.intent,
        status: PacketStatus::Queued,
        created_at: now.clone(),
        updated_at: now,
        completed_at: None,
        ttl_seconds: request.ttl_seconds,
        evidence_refs: request.evidence_refs,
        transitions: Vec::new(),
        retry_count: 0,
        extra: serde_json::Map::new(),
    };
    ops_storage::atomic_json::write_json_atomic(&repo.horizon_packet_json(&packet.packet_id), &packet)?;
    Ok(packet)
}

pub fn read_packet(repo: &Repo, packet_id: &str) -> AppResult<Option<HorizonPacket>> {
    ops_storage::atomic_json::read_json(&repo.horizon_packet_json(packet_id))
}

pub(crate) fn write_packet(repo: &Repo, packet: &HorizonPacket) -> AppResult<()> {
    ops_storage::atomic_json::write_json_atomic(&repo.horizon_packet_json(&packet.packet_id), packet)
}

/// Apply one FSM transition, persisting the updated packet on success.
pub fn transition_packet<C: Clock>(
    repo: &Repo,
    clock: &C,
    packet_id: &str,
    to: PacketStatus,
    note: Option<String>,
) -> AppResult<HorizonPacket> {
    let mut packet = read_packet(repo, packet_id)?
        .ok_or_else(|| AppError::validation("packetId", format!("unknown horizon packet '{packet_id}'")))?;
    packet
        .transition(to, clock.now_rfc3339(), note)
        .map_err(|e| AppError::contract(e.to_string()))?;
    write_packet(repo, &packet)?;
    Ok(packet)
}

/// Every packet currently on disk. Missing or unparseable entries are
/// skipped rather than failing the whole listing — a corrupt single
/// packet file must not block visibility into the rest of the queue.
pub fn list_packets(repo: &Repo) -> AppResult<Vec<HorizonPacket>> {
    let dir = repo.horizon_packets_dir();
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(AppError::io(&dir, e)),
    };

    let mut packets = Vec::new();
    for entry in entries {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if let Ok(Some(packet)) = ops_storage::atomic_json::read_json::<HorizonPacket>(&path) {
            packets.push(packet);
        }
    }
    Ok(packets)
}

/// Sorted by `(horizonRef, createdAt)` (spec §4.10 orchestrate/plan order).
pub fn list_packets_sorted(repo: &Repo) -> AppResult<Vec<HorizonPacket>> {
    let mut packets = list_packets(repo)?;
    packets.sort_by(|a, b| (&a.horizon_ref, &a.created_at).cmp(&(&b.horizon_ref, &b.created_at)));
    Ok(packets)
}

#[cfg(test)]
#[path = "packet_tests.rs"]
mod tests;
