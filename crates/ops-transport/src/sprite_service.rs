// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP bridge transport adapter (spec §4.4/§4.12). Talks to an
//! `ops-service` instance (or any service implementing the same contract)
//! over `reqwest`, authenticating with `X-Ops-Token` and classifying every
//! timeout, auth failure, or non-2xx response as `transport_unreachable`
//! so the reconciler never advances a cursor on a flaky remote.

use async_trait::async_trait;
use ops_core::error::{AppError, AppResult};
use ops_core::model::LoopRunSnapshot;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::control::{ControlOutcome, ControlRequest};
use crate::transport::{EventsPage, Transport};

pub struct SpriteServiceTransport {
    client: Client,
    base_url: String,
    token: String,
    snapshot_timeout: Duration,
    events_timeout: Duration,
    control_timeout: Duration,
}

impl SpriteServiceTransport {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: token.into(),
            snapshot_timeout: Duration::from_secs(5),
            events_timeout: Duration::from_secs(5),
            control_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeouts(
        mut self,
        snapshot: Duration,
        events: Duration,
        control: Duration,
    ) -> Self {
        self.snapshot_timeout = snapshot;
        self.events_timeout = events;
        self.control_timeout = control;
        self
    }

    async fn classify(response: reqwest::Response) -> AppResult<reqwest::Response> {
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::transport(
                "sprite_service rejected the request token",
            )),
            status if status.is_success() => Ok(response),
            status => Err(AppError::transport(format!(
                "sprite_service returned {status}"
            ))),
        }
    }
}

#[async_trait]
impl Transport for SpriteServiceTransport {
    async fn snapshot(&self, loop_id: &str) -> AppResult<LoopRunSnapshot> {
        let response = self
            .client
            .get(format!("{}/ops/snapshot", self.base_url))
            .query(&[("loopId", loop_id)])
            .header("X-Ops-Token", &self.token)
            .timeout(self.snapshot_timeout)
            .send()
            .await
            .map_err(|e| AppError::transport(format!("snapshot request failed: {e}")))?;
        let response = Self::classify(response).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::transport(format!("malformed snapshot response: {e}")))
    }

    async fn events(&self, loop_id: &str, cursor: u64, max_events: u64) -> AppResult<EventsPage> {
        let response = self
            .client
            .get(format!("{}/ops/events", self.base_url))
            .query(&[
                ("loopId", loop_id.to_string()),
                ("cursor", cursor.to_string()),
                ("maxEvents", max_events.to_string()),
            ])
            .header("X-Ops-Token", &self.token)
            .timeout(self.events_timeout)
            .send()
            .await
            .map_err(|e| AppError::transport(format!("events request failed: {e}")))?;
        let response = Self::classify(response).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::transport(format!("malformed events response: {e}")))
    }

    async fn control(&self, request: ControlRequest) -> AppResult<ControlOutcome> {
        let response = self
            .client
            .post(format!("{}/ops/control", self.base_url))
            .header("X-Ops-Token", &self.token)
            .timeout(self.control_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::transport(format!("control request failed: {e}")))?;
        let response = Self::classify(response).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::transport(format!("malformed control response: {e}")))
    }
}

#[cfg(test)]
#[path = "sprite_service_tests.rs"]
mod tests;
