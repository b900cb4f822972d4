// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Direct-filesystem transport adapter: reads the runtime-owned snapshot
//! and event stream straight off disk, and drives `control` through an
//! injected actuator script (`OPS_MANAGER_CONTROL_SCRIPT`), mirroring how
//! the daemon's own local adapters shell out to an agent process rather
//! than going over the wire.

use async_trait::async_trait;
use ops_core::error::{AppError, AppResult};
use ops_core::model::LoopRunSnapshot;
use ops_core::repo::Repo;
use std::collections::BTreeMap;
use std::io::Write;
use std::process::{Command, Stdio};

use crate::control::{ControlOutcome, ControlRequest};
use crate::env;
use crate::transport::{EventsPage, Transport};

pub struct LocalTransport {
    repo: Repo,
}

impl LocalTransport {
    pub fn new(repo: Repo) -> Self {
        Self { repo }
    }

    async fn invoke_actuator(&self, request: &ControlRequest) -> AppResult<ControlOutcome> {
        let Some(script) = env::control_script() else {
            return Err(AppError::transport(
                "no control actuator configured (OPS_MANAGER_CONTROL_SCRIPT unset)",
            ));
        };
        let payload = serde_json::to_vec(request).map_err(AppError::from)?;
        let trace_id = request.trace_id.clone();

        let output = tokio::task::spawn_blocking(move || -> AppResult<std::process::Output> {
            let mut child = Command::new(&script)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .map_err(|e| AppError::transport(format!("failed to spawn control actuator: {e}")))?;

            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| AppError::transport("control actuator stdin unavailable"))?;
            stdin
                .write_all(&payload)
                .map_err(|e| AppError::transport(format!("failed to write actuator stdin: {e}")))?;
            drop(stdin);

            child
                .wait_with_output()
                .map_err(|e| AppError::transport(format!("failed to wait on control actuator: {e}")))
        })
        .await
        .map_err(|e| AppError::transport(format!("control actuator task panicked: {e}")))??;

        if !output.status.success() {
            return Ok(ControlOutcome::failed_command(trace_id));
        }
        match String::from_utf8_lossy(&output.stdout).trim() {
            "confirmed" => Ok(ControlOutcome::confirmed(trace_id)),
            "ambiguous" => Ok(ControlOutcome::ambiguous(trace_id)),
            _ => Ok(ControlOutcome::failed_command(trace_id)),
        }
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn snapshot(&self, loop_id: &str) -> AppResult<LoopRunSnapshot> {
        let path = self.repo.loop_run_summary_json(loop_id);
        ops_storage::atomic_json::read_json(&path)?
            .ok_or_else(|| AppError::transport(format!("no run-summary for loop {loop_id}")))
    }

    async fn events(&self, loop_id: &str, cursor: u64, max_events: u64) -> AppResult<EventsPage> {
        let path = self.repo.loop_events_jsonl(loop_id);
        let rows = ops_storage::jsonl::read_since_typed(&path, cursor)?;

        let mut next_cursor = cursor;
        let mut events = Vec::new();
        for (line_no, event) in rows.into_iter().take(max_events as usize) {
            next_cursor = next_cursor.max(line_no);
            events.push(event);
        }
        Ok(EventsPage {
            events,
            next_cursor,
            ok: true,
        })
    }

    async fn control(&self, request: ControlRequest) -> AppResult<ControlOutcome> {
        let idempotency_path = self.repo.ops_loop_service_idempotency_json(&request.loop_id);
        let mut store: BTreeMap<String, ControlOutcome> =
            ops_storage::atomic_json::read_json(&idempotency_path)?.unwrap_or_default();

        if let Some(existing) = store.get(&request.idempotency_key) {
            return Ok(existing.clone().replayed_from());
        }

        let outcome = self.invoke_actuator(&request).await?;
        store.insert(request.idempotency_key.clone(), outcome.clone());
        ops_storage::atomic_json::write_json_atomic(&idempotency_path, &store)?;
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
