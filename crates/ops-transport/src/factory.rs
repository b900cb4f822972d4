// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build a [`Transport`] for a registry [`LoopEntry`]. Shared by every
//! caller that needs to turn a loop's `transport` field into a live
//! adapter (fleet reconciler, handoff dispatch).

use std::sync::Arc;

use ops_core::error::{AppError, AppResult};
use ops_core::model::registry::{LoopEntry, TransportKind};
use ops_core::repo::Repo;

use crate::local::LocalTransport;
use crate::sprite_service::SpriteServiceTransport;
use crate::transport::Transport;

pub fn build_transport(repo: &Repo, entry: &LoopEntry) -> AppResult<Arc<dyn Transport>> {
    match entry.transport {
        TransportKind::Local => Ok(Arc::new(LocalTransport::new(repo.clone()))),
        TransportKind::SpriteService => {
            let service = entry.service.as_ref().ok_or_else(|| {
                AppError::validation("loops[].service", format!("loop '{}' is missing service config", entry.loop_id))
            })?;
            let base_url = service.base_url.clone().ok_or_else(|| {
                AppError::validation("loops[].service.baseUrl", format!("loop '{}' is missing service.baseUrl", entry.loop_id))
            })?;
            let token = service
                .token_env
                .as_ref()
                .and_then(|name| std::env::var(name).ok())
                .unwrap_or_default();
            Ok(Arc::new(SpriteServiceTransport::new(base_url, token)))
        }
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
