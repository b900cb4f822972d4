// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-key in-process mutex map.
//!
//! Keeps the on-disk idempotency map (spec §4.4/§4.7) as the durable source
//! of truth while serializing concurrent in-process writers of the same key
//! (Design Note 9: "process-level idempotency via files" + "guard per-key
//! with a mutex map").

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

pub struct KeyedMutex<K> {
    locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> Default for KeyedMutex<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedMutex<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`. Other callers with a
    /// *different* key proceed concurrently; callers with the *same* key
    /// serialize.
    pub fn with_lock<R>(&self, key: K, f: impl FnOnce() -> R) -> R {
        let entry = {
            let mut locks = self.locks.lock();
            locks.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
        };
        let _guard = entry.lock();
        f()
    }

    /// Number of distinct keys ever seen (entries are never evicted; the
    /// set of loop/packet ids in a fleet is bounded by the registry).
    pub fn known_keys(&self) -> usize {
        self.locks.lock().len()
    }
}

#[cfg(test)]
#[path = "keyed_lock_tests.rs"]
mod tests;
