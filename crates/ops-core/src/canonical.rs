// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical JSON encoding.
//!
//! The `local` and `sprite_service` transports (spec §4.4, §4.12) must
//! return bytewise-equal snapshot/event/health JSON after "canonical
//! sorting". We canonicalize by re-encoding every object's keys through a
//! `BTreeMap`, which sorts lexicographically regardless of the source
//! `HashMap`/struct field-declaration order, then serialize with the
//! default (no pretty-printing) compact `serde_json` writer so whitespace
//! never differs between call sites.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Recursively re-sort every JSON object's keys.
pub fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            let mut out = serde_json::Map::with_capacity(sorted.len());
            for (k, v) in sorted {
                out.insert(k, v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Serialize `value` to canonical (key-sorted, compact) JSON bytes.
pub fn canonicalize<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let raw = serde_json::to_value(value)?;
    let sorted = sort_keys(raw);
    serde_json::to_vec(&sorted)
}

/// Serialize to a canonical JSON string.
pub fn canonicalize_string<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    canonicalize(value).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

/// True iff two values encode to the same canonical JSON bytes, the parity
/// check used by transport-parity tests (spec Testable Property 8).
pub fn canonically_equal<T: Serialize, U: Serialize>(a: &T, b: &U) -> bool {
    let a = serde_json::to_value(a).ok().map(sort_keys);
    let b = serde_json::to_value(b).ok().map(sort_keys);
    a == b
}

#[cfg(test)]
#[path = "canonical_tests.rs"]
mod tests;
