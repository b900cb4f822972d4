// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry reconciliation (spec §4.10): a `dispatched` packet whose
//! `updatedAt` exceeds `ackTimeoutSeconds` is re-dispatched (incrementing
//! `retryCount`, gated by [`ops_core::retry::BackoffPolicy`]) until
//! `maxRetries`; the next timeout after that escalates into
//! `dead-letter.jsonl`.

use chrono::{DateTime, Utc};
use ops_core::clock::Clock;
use ops_core::config::HorizonConfig;
use ops_core::error::AppResult;
use ops_core::model::horizon::PacketStatus;
use ops_core::repo::Repo;
use serde::{Deserialize, Serialize};

use crate::packet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryAction {
    Redispatched,
    DeadLettered,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryResult {
    pub packet_id: String,
    pub action: RetryAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetterRow {
    pub packet_id: String,
    pub trace_id: String,
    pub retry_count: u32,
    pub timestamp: String,
}

fn elapsed_seconds(since: &str, now: DateTime<Utc>) -> Option<i64> {
    DateTime::parse_from_rfc3339(since).ok().map(|t| (now - t.with_timezone(&Utc)).num_seconds())
}

/// Walk every `dispatched` packet and either leave it alone, re-dispatch
/// it, or escalate it to the dead letter queue.
pub fn reconcile<C: Clock>(repo: &Repo, clock: &C, config: &HorizonConfig) -> AppResult<Vec<RetryResult>> {
    let now = clock.now_utc();
    let policy = config.backoff_policy();
    let mut results = Vec::new();

    for mut candidate in packet::list_packets(repo)? {
        if candidate.status != PacketStatus::Dispatched {
            continue;
        }
        let Some(elapsed) = elapsed_seconds(&candidate.updated_at, now) else {
            results.push(RetryResult { packet_id: candidate.packet_id, action: RetryAction::Skipped });
            continue;
        };
        if elapsed <= config.ack_timeout_seconds as i64 {
            results.push(RetryResult { packet_id: candidate.packet_id, action: RetryAction::Skipped });
            continue;
        }

        if !policy.should_retry(candidate.retry_count) {
            let packet_id = candidate.packet_id.clone();
            let trace_id = candidate.trace_id.clone();
            let retry_count = candidate.retry_count;
            let timestamp = clock.now_rfc3339();
            packet::transition_packet(repo, clock, &packet_id, PacketStatus::DeadLetter, Some("max_retries_exceeded".to_string()))?;
            ops_storage::jsonl::append_line(
                &repo.horizon_telemetry("dead-letter"),
                &DeadLetterRow { packet_id: packet_id.clone(), trace_id, retry_count, timestamp },
            )?;
            results.push(RetryResult { packet_id, action: RetryAction::DeadLettered });
            continue;
        }

        let required_backoff = policy.next_delay(candidate.retry_count).as_secs() as i64;
        if elapsed < required_backoff {
            results.push(RetryResult { packet_id: candidate.packet_id, action: RetryAction::Skipped });
            continue;
        }

        candidate.retry_count += 1;
        candidate.updated_at = clock.now_rfc3339();
        let packet_id = candidate.packet_id.clone();
        packet::write_packet(repo, &candidate)?;
        results.push(RetryResult { packet_id, action: RetryAction::Redispatched });
    }

    Ok(results)
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
