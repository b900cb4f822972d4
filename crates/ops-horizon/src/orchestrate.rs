// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrate/plan and dispatch (spec §4.10). `plan` is a pure read: it
//! sorts queued packets by `(horizonRef, createdAt)` and reports which are
//! blocked from dispatch and why. `dispatch` performs the actual adapter
//! writes and packet transition, honoring `dry_run`.

use chrono::{DateTime, Utc};
use ops_core::clock::Clock;
use ops_core::config::{DirectoryMode, HorizonConfig};
use ops_core::error::AppResult;
use ops_core::model::horizon::{HorizonPacket, PacketStatus, Recipient};
use ops_core::repo::Repo;
use serde::{Deserialize, Serialize};

use crate::packet;

pub const TTL_EXPIRED: &str = "packet_ttl_expired";
pub const DIRECTORY_CONTACT_NOT_FOUND: &str = "directory_contact_not_found";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directory {
    #[serde(default)]
    pub contacts: Vec<Recipient>,
}

fn contact_exists(directory: &Directory, recipient: &Recipient) -> bool {
    directory
        .contacts
        .iter()
        .any(|c| c.recipient_type == recipient.recipient_type && c.id == recipient.id)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedPacket {
    pub packet_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub ready: Vec<String>,
    pub blocked: Vec<BlockedPacket>,
}

fn ttl_expired(packet: &HorizonPacket, now: DateTime<Utc>) -> bool {
    let Some(ttl_seconds) = packet.ttl_seconds else { return false };
    match DateTime::parse_from_rfc3339(&packet.created_at) {
        Ok(created_at) => (now - created_at.with_timezone(&Utc)).num_seconds() > ttl_seconds as i64,
        Err(_) => false,
    }
}

/// Evaluate every `queued` packet against the TTL and directory-contact
/// checks, in `(horizonRef, createdAt)` order.
pub fn plan<C: Clock>(repo: &Repo, clock: &C, config: &HorizonConfig) -> AppResult<PlanReport> {
    let now = clock.now_utc();
    let directory: Directory = ops_storage::atomic_json::read_json(&repo.horizon_directory_json())?.unwrap_or_default();

    let mut ready = Vec::new();
    let mut blocked = Vec::new();

    for candidate in packet::list_packets_sorted(repo)? {
        if candidate.status != PacketStatus::Queued {
            continue;
        }
        if ttl_expired(&candidate, now) {
            blocked.push(BlockedPacket { packet_id: candidate.packet_id, reason: TTL_EXPIRED.to_string() });
            continue;
        }
        if config.directory_mode == DirectoryMode::Required && !contact_exists(&directory, &candidate.recipient) {
            blocked.push(BlockedPacket { packet_id: candidate.packet_id, reason: DIRECTORY_CONTACT_NOT_FOUND.to_string() });
            continue;
        }
        ready.push(candidate.packet_id);
    }

    Ok(PlanReport { ready, blocked })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchAdapter {
    FilesystemOutbox,
    Stdout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchedPacket {
    pub packet_id: String,
    pub envelope: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub dispatched: Vec<DispatchedPacket>,
    pub blocked: Vec<BlockedPacket>,
    pub dry_run: bool,
}

fn recipient_dir_name(recipient: &Recipient) -> &'static str {
    match recipient.recipient_type {
        ops_core::model::horizon::RecipientType::LocalAgent => "local_agent",
        ops_core::model::horizon::RecipientType::Human => "human",
    }
}

/// Dispatch every plan-ready packet. `dry_run` evaluates the same plan but
/// writes no outbox artifact and leaves every packet `queued`.
pub fn dispatch<C: Clock>(repo: &Repo, clock: &C, config: &HorizonConfig, adapter: DispatchAdapter, dry_run: bool) -> AppResult<DispatchReport> {
    let report = plan(repo, clock, config)?;
    let mut dispatched = Vec::new();

    for packet_id in &report.ready {
        let Some(candidate) = packet::read_packet(repo, packet_id)? else { continue };
        let envelope = serde_json::to_value(&candidate).unwrap_or(serde_json::Value::Null);

        if !dry_run {
            if adapter == DispatchAdapter::FilesystemOutbox {
                ops_storage::jsonl::append_line(
                    &repo.horizon_outbox_jsonl(recipient_dir_name(&candidate.recipient), &candidate.recipient.id),
                    &envelope,
                )?;
            }
            packet::transition_packet(repo, clock, packet_id, PacketStatus::Dispatched, None)?;
        }

        dispatched.push(DispatchedPacket { packet_id: packet_id.clone(), envelope });
    }

    Ok(DispatchReport { dispatched, blocked: report.blocked, dry_run })
}

#[cfg(test)]
#[path = "orchestrate_tests.rs"]
mod tests;
