// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /ops/snapshot?loopId=...` (spec §4.12).

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use ops_core::canonical::canonicalize;
use ops_transport::Transport;
use std::collections::HashMap;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn get_snapshot(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let loop_id = params
        .get("loopId")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("missing required query parameter 'loopId'"))?;

    let entry = state.find_loop(loop_id)?;
    let transport = ops_transport::build_transport(&state.repo, &entry)?;
    let snapshot = transport.snapshot(loop_id).await?;

    let body = canonicalize(&snapshot).map_err(|e| ApiError::internal(e.to_string()))?;
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response())
}
