// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Suppression precedence (spec §4.6 step 2): a loop-scoped suppression
//! entry strictly dominates the global `*` entry for the same category.

use ops_core::model::policy::{PolicyCandidate, SuppressionScope};
use ops_core::model::registry::PolicyConfig;

const GLOBAL_SCOPE: &str = "*";

/// Apply suppression in place. Loop scope wins over global scope; a
/// candidate matching neither is left unsuppressed.
pub fn apply(candidate: &mut PolicyCandidate, policy: &PolicyConfig) {
    let category = candidate.category.as_str();

    if policy
        .suppressions
        .get(candidate.loop_id.as_str())
        .is_some_and(|categories| categories.contains(category))
    {
        candidate.suppressed = true;
        candidate.suppression_scope = Some(SuppressionScope::Loop);
        candidate.suppression_reason = Some(format!("loop '{}' suppresses category '{category}'", candidate.loop_id));
        return;
    }

    if policy
        .suppressions
        .get(GLOBAL_SCOPE)
        .is_some_and(|categories| categories.contains(category))
    {
        candidate.suppressed = true;
        candidate.suppression_scope = Some(SuppressionScope::Global);
        candidate.suppression_reason = Some(format!("global suppression of category '{category}'"));
    }
}

/// Apply suppression to every candidate in place.
pub fn apply_all(candidates: &mut [PolicyCandidate], policy: &PolicyConfig) {
    for candidate in candidates {
        apply(candidate, policy);
    }
}

#[cfg(test)]
#[path = "suppression_tests.rs"]
mod tests;
