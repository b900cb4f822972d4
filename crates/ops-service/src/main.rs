// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entrypoint for the `sprite_service` transport's HTTP front door.
//!
//! Refuses to start without `OPS_MANAGER_SERVICE_TOKEN` set: an
//! unauthenticated service would accept unsigned control requests, and
//! the transport contract (spec §4.4/§4.12) treats the token as
//! mandatory, not merely advisory.

use ops_core::repo::Repo;
use ops_service::{env, router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).json().init();

    let Some(token) = ops_transport::env::service_token() else {
        tracing::error!("OPS_MANAGER_SERVICE_TOKEN is not set; refusing to start unauthenticated");
        std::process::exit(1);
    };

    let root = env::repo_root()?;
    let state = AppState::new(Repo::new(root), token);
    let addr = env::bind_addr();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "ops-manager-service listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
