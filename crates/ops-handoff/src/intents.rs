// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan pass (spec §4.7): turn every unsuppressed policy candidate into a
//! `HandoffIntent`, append any new ones to their owning loop's
//! `intents.jsonl`, and roll the full current view up into
//! `fleet/handoff-state.json`.

use std::collections::BTreeMap;

use ops_core::error::AppResult;
use ops_core::model::handoff::{HandoffIntent, HandoffStatus};
use ops_core::model::policy::PolicyCandidate;
use ops_core::model::registry::{FleetRegistry, TransportKind};
use ops_core::repo::Repo;
use ops_core::rollout::stable_hash;

fn loop_transport(registry: &FleetRegistry, loop_id: &str) -> TransportKind {
    registry
        .loops
        .iter()
        .find(|entry| entry.loop_id == loop_id)
        .map(|entry| entry.transport)
        .unwrap_or(TransportKind::Local)
}

/// Build one intent per unsuppressed candidate, in candidate order (spec
/// §5 ordering guarantee (v): "handoff intent order matches candidate
/// order").
pub fn plan(registry: &FleetRegistry, candidates: &[PolicyCandidate], trace_id: &str) -> Vec<HandoffIntent> {
    candidates
        .iter()
        .filter(|c| !c.suppressed)
        .map(|candidate| {
            let intent = candidate.recommended_intent.clone();
            let intent_id = HandoffIntent::make_id(&candidate.candidate_id, &intent);
            let idempotency_key = format!("fleet-handoff-{trace_id}-{}", stable_hash(&intent_id));
            HandoffIntent {
                intent_id,
                loop_id: candidate.loop_id.clone(),
                category: candidate.category.as_str().to_string(),
                intent,
                status: HandoffStatus::PendingOperatorConfirmation,
                autonomous: candidate.autonomous.clone(),
                idempotency_key,
                transport: loop_transport(registry, &candidate.loop_id),
                reason_codes: Vec::new(),
            }
        })
        .collect()
}

/// Append intents this plan pass has not seen before (by `intentId`) to
/// each owning loop's `intents.jsonl`. Already-known intent IDs are left
/// untouched — `intents.jsonl` never rewrites a prior row.
pub fn persist_new(repo: &Repo, intents: &[HandoffIntent]) -> AppResult<()> {
    let mut by_loop: BTreeMap<&str, Vec<&HandoffIntent>> = BTreeMap::new();
    for intent in intents {
        by_loop.entry(intent.loop_id.as_str()).or_default().push(intent);
    }

    for (loop_id, loop_intents) in by_loop {
        let path = repo.ops_loop_intents_jsonl(loop_id);
        let existing: Vec<(u64, HandoffIntent)> = ops_storage::jsonl::read_since_typed(&path, 0)?;
        let known_ids: std::collections::BTreeSet<&str> =
            existing.iter().map(|(_, intent)| intent.intent_id.as_str()).collect();

        for intent in loop_intents {
            if !known_ids.contains(intent.intent_id.as_str()) {
                ops_storage::jsonl::append_line(&path, intent)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "intents_tests.rs"]
mod tests;
