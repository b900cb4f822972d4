// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State projector (spec §4.1): turns a snapshot plus zero or more
//! strictly-ordered events into a new `ProjectedState`.

use ops_core::error::{AppError, AppResult};
use ops_core::model::projection::{Confidence, Divergence, DivergenceFlags, Transition};
use ops_core::model::snapshot::{Cursor, LoopRunEvent, LoopRunSnapshot};
use ops_core::model::ProjectedState;

pub struct ProjectorInput<'a> {
    pub snapshot: &'a LoopRunSnapshot,
    pub events: &'a [LoopRunEvent],
    pub prior: Option<&'a ProjectedState>,
    pub trace_id: &'a str,
}

/// Project a new state. Returns `Err` (no advance) iff the event stream
/// violates the strictly-increasing sequence invariant (spec §4.1
/// Failures).
pub fn project(input: ProjectorInput<'_>) -> AppResult<ProjectedState> {
    validate_event_order(input.events)?;

    let mut flags = DivergenceFlags::default();
    let mut confidence = Confidence::High;

    if input.snapshot.gate_summary.approval.as_deref() == Some("approved")
        && input.snapshot.gate_summary.completion_ok == Some(false)
    {
        flags.approval_completion_conflict = true;
    }

    if let Some(state_loop_id) = &input.snapshot.state_current_loop_id {
        if state_loop_id != &input.snapshot.runtime.loop_id {
            flags.state_loop_run_mismatch = true;
        }
    }

    let prior_cursor = input.prior.map(|p| p.cursor).unwrap_or_default();
    if prior_cursor.has_regressed(&input.snapshot.cursor) {
        flags.cursor_regression = true;
        confidence = Confidence::Low;
    }

    // A low-confidence pass must not silently clear flags a prior pass had
    // already recorded (spec §4.1: "may not clear a prior divergence flag
    // in the same pass").
    if confidence == Confidence::Low {
        if let Some(prior) = input.prior {
            flags = flags.union(prior.divergence.flags);
        }
    }

    let current_state = input
        .events
        .last()
        .map(|e| e.name.clone())
        .unwrap_or_else(|| format!("{:?}", input.snapshot.runtime.status).to_lowercase());
    let triggering_signal = input
        .events
        .last()
        .map(|e| format!("event:{}", e.name))
        .unwrap_or_else(|| "snapshot".to_string());

    let candidate_offset = input
        .events
        .last()
        .map(|e| e.line_offset())
        .unwrap_or(input.snapshot.cursor.event_line_offset);
    let new_offset = candidate_offset.max(prior_cursor.event_line_offset);

    Ok(ProjectedState {
        projection: serde_json::json!({ "runtime": input.snapshot.runtime }),
        transition: Transition {
            current_state,
            triggering_signal,
            confidence,
        },
        divergence: Divergence::from_flags(flags),
        cursor: Cursor::new(new_offset),
        trace_id: input.trace_id.to_string(),
    })
}

fn validate_event_order(events: &[LoopRunEvent]) -> AppResult<()> {
    let mut prev: Option<u64> = None;
    for event in events {
        let seq = event.sequence.value;
        if let Some(prev_seq) = prev {
            if seq <= prev_seq {
                return Err(AppError::contract(format!(
                    "event sequence {seq} is not strictly greater than prior sequence {prev_seq}"
                )));
            }
        }
        prev = Some(seq);
    }
    Ok(())
}

#[cfg(test)]
#[path = "projector_tests.rs"]
mod tests;
