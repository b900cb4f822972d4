// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `HorizonPacket` and its FSM (spec §3, §4.10).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketStatus {
    Queued,
    Dispatched,
    Acknowledged,
    InProgress,
    Completed,
    Escalated,
    DeadLetter,
}

impl PacketStatus {
    /// Allowed-transition table (spec §4.10). Returns whether `self -> to`
    /// is a legal FSM edge.
    pub fn can_transition_to(self, to: PacketStatus) -> bool {
        use PacketStatus::*;
        matches!(
            (self, to),
            (Queued, Dispatched)
                | (Queued, DeadLetter)
                | (Dispatched, Acknowledged)
                | (Dispatched, Escalated)
                | (Dispatched, DeadLetter)
                | (Acknowledged, InProgress)
                | (Acknowledged, DeadLetter)
                | (InProgress, Completed)
                | (InProgress, Escalated)
                | (InProgress, DeadLetter)
                | (Escalated, Dispatched)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientType {
    LocalAgent,
    Human,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(rename = "type")]
    pub recipient_type: RecipientType,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: PacketStatus,
    pub to: PacketStatus,
    pub at: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonPacket {
    #[serde(rename = "packetId")]
    pub packet_id: String,
    #[serde(rename = "traceId")]
    pub trace_id: String,
    #[serde(rename = "horizonRef")]
    pub horizon_ref: String,
    pub sender: String,
    pub recipient: Recipient,
    pub intent: String,
    pub status: PacketStatus,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    #[serde(rename = "completedAt", default)]
    pub completed_at: Option<String>,
    #[serde(rename = "ttlSeconds", default)]
    pub ttl_seconds: Option<u64>,
    #[serde(rename = "evidenceRefs", default)]
    pub evidence_refs: Vec<String>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
    #[serde(rename = "retryCount", default)]
    pub retry_count: u32,
    /// Unknown object keys from producers we don't fully model are
    /// preserved opaquely (spec §4.11: "unknown object keys are preserved
    /// as opaque").
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, thiserror::Error)]
#[error("illegal horizon packet transition: {from:?} -> {to:?}")]
pub struct IllegalTransition {
    pub from: PacketStatus,
    pub to: PacketStatus,
}

impl HorizonPacket {
    /// Attempt a transition, recording it in `transitions` on success and
    /// setting `completedAt` iff the new status is `completed`.
    pub fn transition(&mut self, to: PacketStatus, at: impl Into<String>, note: Option<String>) -> Result<(), IllegalTransition> {
        if !self.status.can_transition_to(to) {
            return Err(IllegalTransition { from: self.status, to });
        }
        let at = at.into();
        self.transitions.push(Transition {
            from: self.status,
            to,
            at: at.clone(),
            note,
        });
        self.status = to;
        self.updated_at = at.clone();
        self.completed_at = if to == PacketStatus::Completed { Some(at) } else { None };
        Ok(())
    }
}

#[cfg(test)]
#[path = "horizon_tests.rs"]
mod tests;
