// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `X-Ops-Token` auth middleware (spec §4.12/§6). Every endpoint except
//! `/healthz` runs behind this.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

const TOKEN_HEADER: &str = "x-ops-token";

pub async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let presented = request.headers().get(TOKEN_HEADER).and_then(|v| v.to_str().ok());
    match presented {
        Some(token) if token == state.token.as_ref() => next.run(request).await,
        _ => {
            use axum::response::IntoResponse;
            ApiError::unauthorized("missing or invalid X-Ops-Token").into_response()
        }
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
