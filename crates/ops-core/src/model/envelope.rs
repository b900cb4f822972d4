// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Common envelope fields shared by every on-disk artifact (spec §6):
//! `schemaVersion`, `envelopeType`, `traceId`, and either a `sequence` (for
//! snapshot/event envelopes) or a `timestamp` (for telemetry rows).

use serde::{Deserialize, Serialize};

/// Schema version tag. Only `"v1"` exists today; the type exists so a
/// future `v2` is a compile-time-visible addition rather than a silent
/// string mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaVersion {
    #[serde(rename = "v1")]
    V1,
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::V1
    }
}

/// Monotonic line-offset sequence carried by snapshot/event envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub source: String,
    pub value: u64,
}

impl Sequence {
    pub fn new(source: impl Into<String>, value: u64) -> Self {
        Self {
            source: source.into(),
            value,
        }
    }
}

/// Generic envelope wrapper used by telemetry rows: every JSONL line in
/// `telemetry/*.jsonl` carries `schemaVersion`, `traceId`, a `timestamp`,
/// and a `body` specific to that telemetry stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "schemaVersion")]
    pub schema_version: SchemaVersion,
    #[serde(rename = "traceId")]
    pub trace_id: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Envelope<T> {
    pub fn new(trace_id: impl Into<String>, timestamp: impl Into<String>, body: T) -> Self {
        Self {
            schema_version: SchemaVersion::V1,
            trace_id: trace_id.into(),
            timestamp: timestamp.into(),
            body,
        }
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
