// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic, dependency-free stable hashing (spec §4.6 step 4(f)'s
//! canary cohort bucketing, and §4.7's `stable-hash(intentId)` idempotency
//! key component — §9 Open Question: "exact hash function ... unspecified
//! beyond 'stable integer hash mod 100'" for the former, silent on the
//! latter).
//!
//! FNV-1a is chosen for both: it is a plain fold over bytes with no
//! platform- or endianness-dependent behavior, so the same input hashes
//! identically on every platform and every run, which is the only hard
//! requirement either caller has.

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Stable hash of an arbitrary string, rendered as lowercase hex. Used
/// anywhere a caller needs a short, reproducible fingerprint of a string
/// rather than the string itself (e.g. an idempotency key component).
pub fn stable_hash(s: &str) -> String {
    format!("{:016x}", fnv1a(s.as_bytes()))
}

/// Bucket a loop into `[0, 100)` from `"<loopId>|<salt>"`. A candidate is
/// in-cohort iff `bucket < canaryPercent`.
pub fn cohort_bucket(loop_id: &str, salt: &str) -> u8 {
    let key = format!("{loop_id}|{salt}");
    (fnv1a(key.as_bytes()) % 100) as u8
}

#[cfg(test)]
#[path = "rollout_tests.rs"]
mod tests;
