// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /ops/control` (spec §4.12): `{loopId, intent, idempotencyKey,
//! traceId, payload}`. Writes for the same `loopId` serialize through
//! [`crate::state::ControlLocks`] so two concurrent requests can't race
//! past the on-disk idempotency map.

use axum::extract::State;
use axum::Json;
use ops_transport::{ControlOutcome, ControlRequest, Transport};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn post_control(
    State(state): State<AppState>,
    Json(request): Json<ControlRequest>,
) -> Result<Json<ControlOutcome>, ApiError> {
    if request.loop_id.is_empty() || request.intent.is_empty() || request.idempotency_key.is_empty() {
        return Err(ApiError::bad_request("loopId, intent, and idempotencyKey are required"));
    }

    let entry = state.find_loop(&request.loop_id)?;
    let transport = ops_transport::build_transport(&state.repo, &entry)?;

    let loop_id = request.loop_id.clone();
    let outcome = state
        .with_control_lock(&loop_id, || async { transport.control(request).await })
        .await?;

    Ok(Json(outcome))
}
