// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Everything a command handler needs to touch the repo: the repo
//! handle, a real clock/id generator (never the fakes tests use), and
//! the loaded TOML configuration.

use ops_core::clock::SystemClock;
use ops_core::id::UuidIdGen;
use ops_core::repo::Repo;

use crate::config::OpsManagerConfig;

#[derive(Clone)]
pub struct Ctx {
    pub repo: Repo,
    pub clock: SystemClock,
    pub id_gen: UuidIdGen,
    pub config: OpsManagerConfig,
}

impl Ctx {
    pub fn new(repo: Repo, config: OpsManagerConfig) -> Self {
        Self { repo, clock: SystemClock, id_gen: UuidIdGen, config }
    }

    /// Trace id for a single-loop operation: the operator's own id if
    /// given, otherwise a fresh one (spec §4.5 envelopes always carry a
    /// `traceId`, generated here when the caller has none to propagate).
    pub fn trace_id(&self, given: Option<String>) -> String {
        given.unwrap_or_else(|| ops_core::id::IdGen::new_id(&self.id_gen))
    }
}
