// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `horizon-packet`, `horizon-orchestrate`, `horizon-ack`,
//! `horizon-retry`, `horizon-bridge` (spec §6/§4.10/§4.11).

use ops_core::model::horizon::{PacketStatus, Recipient};
use ops_horizon::ack::{self, AckReceipt};
use ops_horizon::bridge;
use ops_horizon::orchestrate::{self, DispatchAdapter};
use ops_horizon::packet::{self, CreatePacketRequest};
use ops_horizon::retry;
use serde_json::Value;

use crate::commands::support::load_registry;
use crate::context::Ctx;
use crate::exit_error::ExitError;

pub fn packet_create(
    ctx: &Ctx,
    horizon_ref: String,
    sender: String,
    recipient: Recipient,
    intent: String,
    ttl_seconds: Option<u64>,
    evidence_refs: Vec<String>,
) -> Result<Value, ExitError> {
    let request = CreatePacketRequest { horizon_ref, sender, recipient, intent, ttl_seconds, evidence_refs };
    let created = packet::create_packet(&ctx.repo, &ctx.clock, &ctx.id_gen, request).map_err(ExitError::from)?;
    serde_json::to_value(&created).map_err(|e| ExitError::usage(e.to_string()))
}

pub fn packet_show(ctx: &Ctx, packet_id: &str) -> Result<Value, ExitError> {
    let found = packet::read_packet(&ctx.repo, packet_id).map_err(ExitError::from)?;
    let found = found.ok_or_else(|| ExitError::usage(format!("unknown horizon packet '{packet_id}'")))?;
    serde_json::to_value(&found).map_err(|e| ExitError::usage(e.to_string()))
}

pub fn packet_list(ctx: &Ctx) -> Result<Value, ExitError> {
    let packets = packet::list_packets_sorted(&ctx.repo).map_err(ExitError::from)?;
    serde_json::to_value(&packets).map_err(|e| ExitError::usage(e.to_string()))
}

pub fn packet_transition(ctx: &Ctx, packet_id: &str, to: PacketStatus, note: Option<String>) -> Result<Value, ExitError> {
    let updated = packet::transition_packet(&ctx.repo, &ctx.clock, packet_id, to, note).map_err(ExitError::from)?;
    serde_json::to_value(&updated).map_err(|e| ExitError::usage(e.to_string()))
}

pub fn orchestrate_plan(ctx: &Ctx) -> Result<Value, ExitError> {
    let report = orchestrate::plan(&ctx.repo, &ctx.clock, &ctx.config.horizon).map_err(ExitError::from)?;
    serde_json::to_value(&report).map_err(|e| ExitError::usage(e.to_string()))
}

pub fn orchestrate_dispatch(ctx: &Ctx, adapter: DispatchAdapter, dry_run: bool) -> Result<Value, ExitError> {
    let report = orchestrate::dispatch(&ctx.repo, &ctx.clock, &ctx.config.horizon, adapter, dry_run).map_err(ExitError::from)?;
    serde_json::to_value(&report).map_err(|e| ExitError::usage(e.to_string()))
}

pub fn ack_ingest(ctx: &Ctx, packet_id: String, trace_id: String, to: PacketStatus, note: Option<String>) -> Result<Value, ExitError> {
    let receipt = AckReceipt { packet_id, trace_id, to, note };
    let outcome = ack::ingest(&ctx.repo, &ctx.clock, receipt).map_err(ExitError::from)?;
    serde_json::to_value(&outcome).map_err(|e| ExitError::usage(e.to_string()))
}

pub fn retry_reconcile(ctx: &Ctx) -> Result<Value, ExitError> {
    let results = retry::reconcile(&ctx.repo, &ctx.clock, &ctx.config.horizon).map_err(ExitError::from)?;
    serde_json::to_value(&results).map_err(|e| ExitError::usage(e.to_string()))
}

pub fn bridge_ingest(ctx: &Ctx) -> Result<Value, ExitError> {
    let registry = load_registry(&ctx.repo).ok();
    let results = bridge::ingest_all(&ctx.repo, &ctx.clock, registry.as_ref()).map_err(ExitError::from)?;
    let values: Vec<Value> = results
        .into_iter()
        .map(|r| match r {
            Ok(result) => serde_json::to_value(result).unwrap_or(Value::Null),
            Err(err) => serde_json::json!({ "error": err.to_string() }),
        })
        .collect();
    Ok(Value::Array(values))
}

#[cfg(test)]
#[path = "horizon_tests.rs"]
mod tests;
