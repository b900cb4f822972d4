// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP front door for the `sprite_service` transport (spec §4.12): the
//! same three loop operations the `local` transport exposes over a CLI
//! shell-out, served as `GET /ops/snapshot`, `GET /ops/events`, and
//! `POST /ops/control`, plus an unauthenticated `GET /healthz`.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod auth;
pub mod env;
pub mod error;
pub mod routes;
pub mod state;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the complete service router. `/healthz` is reachable without a
/// token so orchestrators can probe liveness before credentials exist.
pub fn router(state: AppState) -> Router {
    let ops_routes = Router::new()
        .route("/ops/snapshot", get(routes::snapshot::get_snapshot))
        .route("/ops/events", get(routes::events::get_events))
        .route("/ops/control", post(routes::control::post_control))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_token));

    Router::new()
        .route("/healthz", get(routes::health::get_healthz))
        .merge(ops_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
