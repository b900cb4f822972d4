// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /healthz` (spec §4.12). Liveness only, no auth, no repo I/O.

use axum::Json;
use serde_json::{json, Value};

pub async fn get_healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
