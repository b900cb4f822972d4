// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /ops/events?loopId&cursor&maxEvents` (spec §4.12).

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use ops_core::canonical::canonicalize;
use ops_transport::Transport;
use std::collections::HashMap;

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_MAX_EVENTS: u64 = 100;

fn parse_u64(params: &HashMap<String, String>, key: &str, default: u64) -> Result<u64, ApiError> {
    match params.get(key) {
        None => Ok(default),
        Some(raw) => raw.parse::<u64>().map_err(|_| ApiError::bad_request(format!("'{key}' must be a non-negative integer"))),
    }
}

pub async fn get_events(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let loop_id = params
        .get("loopId")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("missing required query parameter 'loopId'"))?;
    let cursor = parse_u64(&params, "cursor", 0)?;
    let max_events = parse_u64(&params, "maxEvents", DEFAULT_MAX_EVENTS)?;

    let entry = state.find_loop(loop_id)?;
    let transport = ops_transport::build_transport(&state.repo, &entry)?;
    let page = transport.events(loop_id, cursor, max_events).await?;

    let body = canonicalize(&page).map_err(|e| ApiError::internal(e.to_string()))?;
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response())
}
