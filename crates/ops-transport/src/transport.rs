// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The transport abstraction (spec §4.4): `local` and `sprite_service`
//! expose the same three operations and must agree, after canonical
//! sorting, on every JSON projection they produce.

use async_trait::async_trait;
use ops_core::error::AppResult;
use ops_core::model::{LoopRunEvent, LoopRunSnapshot};
use serde::{Deserialize, Serialize};

use crate::control::{ControlOutcome, ControlRequest};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    pub events: Vec<LoopRunEvent>,
    pub next_cursor: u64,
    pub ok: bool,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn snapshot(&self, loop_id: &str) -> AppResult<LoopRunSnapshot>;

    async fn events(&self, loop_id: &str, cursor: u64, max_events: u64) -> AppResult<EventsPage>;

    async fn control(&self, request: ControlRequest) -> AppResult<ControlOutcome>;
}
