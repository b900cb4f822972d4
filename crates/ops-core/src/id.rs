// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID generation abstractions.
//!
//! Trace ids, packet ids, and idempotency keys need global uniqueness across
//! the whole fleet rather than the short per-process-readable ids a single
//! superloop agent uses, so generation goes through [`UuidIdGen`] rather than
//! a nanoid-style short id. Tests that need deterministic ids use
//! [`FakeIdGen`].

use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// Generates unique identifiers. Abstracted so tests can substitute a
/// deterministic sequence.
pub trait IdGen: Clone + Send + Sync + 'static {
    fn new_id(&self) -> String;
}

/// Real generator backed by UUID v4.
#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic generator for tests: returns `"<prefix>-0"`, `"<prefix>-1"`, …
#[derive(Clone)]
pub struct FakeIdGen {
    prefix: Arc<str>,
    next: Arc<Mutex<u64>>,
}

impl FakeIdGen {
    pub fn new(prefix: impl Into<Arc<str>>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Arc::new(Mutex::new(0)),
        }
    }
}

impl IdGen for FakeIdGen {
    fn new_id(&self) -> String {
        let mut guard = self.next.lock();
        let id = format!("{}-{}", self.prefix, *guard);
        *guard += 1;
        id
    }
}

/// Derive a per-loop trace id from a fleet-level trace id, per spec §4.5:
/// `"<fleetTraceId>-<loopId>"`.
pub fn derive_loop_trace_id(fleet_trace_id: &str, loop_id: &str) -> String {
    format!("{fleet_trace_id}-{loop_id}")
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
