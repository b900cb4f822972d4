// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared server state: the repo handle, the configured service token, and
//! the per-loopId control lock (spec §5 "the service serializes
//! control-endpoint writes per loopId through an in-process mutex").

use std::collections::HashMap;
use std::sync::Arc;

use ops_core::error::AppResult;
use ops_core::model::registry::{FleetRegistry, LoopEntry};
use ops_core::repo::Repo;
use parking_lot::Mutex;

use crate::error::ApiError;

/// A per-key async mutex map. [`ops_core::keyed_lock::KeyedMutex`] is
/// sync-only (its critical section can't hold a lock across an `.await`),
/// and the work this crate needs to serialize — a transport's `control`
/// call — is itself async, so this crate keeps its own `tokio::sync::Mutex`
/// variant of the same per-key locking shape instead.
#[derive(Default)]
pub struct ControlLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ControlLocks {
    fn entry(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock();
        locks.entry(key.to_string()).or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))).clone()
    }

    pub async fn with_lock<F, Fut, R>(&self, key: &str, f: F) -> R
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = R>,
    {
        let lock = self.entry(key);
        let _guard = lock.lock().await;
        f().await
    }
}

#[derive(Clone)]
pub struct AppState {
    pub repo: Repo,
    pub token: Arc<str>,
    control_locks: Arc<ControlLocks>,
}

impl AppState {
    pub fn new(repo: Repo, token: impl Into<Arc<str>>) -> Self {
        Self { repo, token: token.into(), control_locks: Arc::new(ControlLocks::default()) }
    }

    pub fn load_registry(&self) -> AppResult<FleetRegistry> {
        ops_storage::atomic_json::read_json(&self.repo.fleet_registry_json())?
            .ok_or_else(|| ops_core::error::AppError::validation("registry", "fleet registry not found"))
    }

    pub fn find_loop(&self, loop_id: &str) -> Result<LoopEntry, ApiError> {
        let registry = self.load_registry().map_err(ApiError::from)?;
        registry
            .loops
            .into_iter()
            .find(|entry| entry.loop_id == loop_id && entry.enabled)
            .ok_or_else(|| ApiError::not_found(format!("unknown loop '{loop_id}'")))
    }

    pub async fn with_control_lock<F, Fut, R>(&self, loop_id: &str, f: F) -> R
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = R>,
    {
        self.control_locks.with_lock(loop_id, f).await
    }
}
