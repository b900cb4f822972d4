// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ops-manager` CLI (spec §6): one process per invocation, one JSON
//! document on stdout per invocation, exit codes per [`exit_error`].

mod commands;
mod config;
mod context;
mod env;
mod exit_error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ops_core::model::horizon::{PacketStatus, Recipient, RecipientType};
use ops_core::repo::Repo;
use ops_promotion::apply::{ApplyIntent, ApplyRequest};
use ops_promotion::orchestrator::PromotionMode;
use serde_json::Value;

use config::OpsManagerConfig;
use context::Ctx;
use exit_error::ExitError;

#[derive(Parser)]
#[command(name = "ops-manager")]
#[command(about = "Control plane for superloop-managed ops loops")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// TOML file with [reconciler]/[horizon]/[promotion] tables; any
    /// table left out keeps its default.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one reconcile pass for a single loop.
    Reconcile {
        loop_id: String,
        #[arg(long)]
        trace_id: Option<String>,
    },
    /// Read a single loop's last reconciled snapshot.
    Status { loop_id: String },
    /// Send one control intent to a single loop.
    Control {
        loop_id: String,
        #[arg(long)]
        intent: String,
        #[arg(long)]
        idempotency_key: String,
        #[arg(long)]
        trace_id: Option<String>,
        /// Inline JSON payload; defaults to `{}`.
        #[arg(long, default_value = "{}")]
        payload: String,
    },
    /// Run a reconcile pass over every enabled loop in the registry.
    FleetReconcile {
        #[arg(long)]
        trace_id: Option<String>,
        #[arg(long)]
        deterministic_order: bool,
        #[arg(long, default_value_t = 4)]
        max_parallel: usize,
    },
    /// Print the last persisted fleet reconcile state.
    FleetStatus,
    /// Run the policy pass over the last fleet reconcile state.
    FleetPolicy {
        #[arg(long)]
        trace_id: Option<String>,
    },
    /// Run the handoff pass over the last fleet policy state.
    FleetHandoff {
        #[arg(long)]
        trace_id: Option<String>,
        /// Execute the named pending intents (requires --confirm).
        #[arg(long = "execute")]
        execute: Vec<String>,
        #[arg(long)]
        confirm: bool,
        #[arg(long)]
        autonomous_execute: bool,
    },
    /// Dispatch a loop's new escalations through the configured sinks.
    AlertDispatch { loop_id: String },
    /// Evaluate promotion gates for the fleet.
    PromotionGates {
        #[arg(long)]
        fail_on_hold: bool,
    },
    /// Apply (or roll back) a promotion intent, gated by the promotion
    /// decision unless the intent is a rollback.
    PromotionApply {
        #[command(subcommand)]
        intent: ApplyIntentArg,
        #[arg(long)]
        by: String,
        #[arg(long)]
        approval_ref: String,
        #[arg(long)]
        rationale: String,
        #[arg(long)]
        review_by: String,
        #[arg(long)]
        idempotency_key: String,
    },
    /// Evaluate gates and, depending on mode, apply or roll back.
    PromotionOrchestrate {
        #[arg(long, value_enum)]
        mode: PromotionModeArg,
        #[command(subcommand)]
        intent: Option<ApplyIntentArg>,
        #[arg(long)]
        by: Option<String>,
        #[arg(long)]
        approval_ref: Option<String>,
        #[arg(long)]
        rationale: Option<String>,
        #[arg(long)]
        review_by: Option<String>,
        #[arg(long)]
        idempotency_key: Option<String>,
    },
    /// Create, transition, list, or show horizon packets.
    HorizonPacket {
        #[command(subcommand)]
        action: HorizonPacketAction,
    },
    /// Plan or dispatch queued horizon packets.
    HorizonOrchestrate {
        #[command(subcommand)]
        action: HorizonOrchestrateAction,
    },
    /// Ingest an ACK receipt for a horizon packet.
    HorizonAck {
        #[command(subcommand)]
        action: HorizonAckAction,
    },
    /// Reconcile horizon packet retries/dead-lettering.
    HorizonRetry {
        #[command(subcommand)]
        action: HorizonRetryAction,
    },
    /// Ingest every pending envelope in the horizon bridge inbox.
    HorizonBridge,
}

#[derive(Subcommand)]
enum ApplyIntentArg {
    /// Expand rollout to the given step.
    Expand { step: u8 },
    Resume,
    Rollback,
}

impl From<ApplyIntentArg> for ApplyIntent {
    fn from(arg: ApplyIntentArg) -> Self {
        match arg {
            ApplyIntentArg::Expand { step } => ApplyIntent::Expand { step },
            ApplyIntentArg::Resume => ApplyIntent::Resume,
            ApplyIntentArg::Rollback => ApplyIntent::Rollback,
        }
    }
}

#[derive(Clone, clap::ValueEnum)]
enum PromotionModeArg {
    DryRun,
    Apply,
    Rollback,
}

impl From<PromotionModeArg> for PromotionMode {
    fn from(arg: PromotionModeArg) -> Self {
        match arg {
            PromotionModeArg::DryRun => PromotionMode::DryRun,
            PromotionModeArg::Apply => PromotionMode::Apply,
            PromotionModeArg::Rollback => PromotionMode::Rollback,
        }
    }
}

#[derive(Clone, clap::ValueEnum)]
enum PacketStatusArg {
    Queued,
    Dispatched,
    Acknowledged,
    InProgress,
    Completed,
    Escalated,
    DeadLetter,
}

impl From<PacketStatusArg> for PacketStatus {
    fn from(arg: PacketStatusArg) -> Self {
        match arg {
            PacketStatusArg::Queued => PacketStatus::Queued,
            PacketStatusArg::Dispatched => PacketStatus::Dispatched,
            PacketStatusArg::Acknowledged => PacketStatus::Acknowledged,
            PacketStatusArg::InProgress => PacketStatus::InProgress,
            PacketStatusArg::Completed => PacketStatus::Completed,
            PacketStatusArg::Escalated => PacketStatus::Escalated,
            PacketStatusArg::DeadLetter => PacketStatus::DeadLetter,
        }
    }
}

#[derive(Clone, clap::ValueEnum)]
enum RecipientTypeArg {
    LocalAgent,
    Human,
}

impl From<RecipientTypeArg> for RecipientType {
    fn from(arg: RecipientTypeArg) -> Self {
        match arg {
            RecipientTypeArg::LocalAgent => RecipientType::LocalAgent,
            RecipientTypeArg::Human => RecipientType::Human,
        }
    }
}

#[derive(Subcommand)]
enum HorizonPacketAction {
    Create {
        #[arg(long)]
        horizon_ref: String,
        #[arg(long)]
        sender: String,
        #[arg(long, value_enum)]
        recipient_type: RecipientTypeArg,
        #[arg(long)]
        recipient_id: String,
        #[arg(long)]
        intent: String,
        #[arg(long)]
        ttl_seconds: Option<u64>,
        #[arg(long = "evidence-ref")]
        evidence_refs: Vec<String>,
    },
    Transition {
        packet_id: String,
        #[arg(long, value_enum)]
        to: PacketStatusArg,
        #[arg(long)]
        note: Option<String>,
    },
    List,
    Show { packet_id: String },
}

#[derive(Subcommand)]
enum HorizonOrchestrateAction {
    Plan,
    Dispatch {
        #[arg(long, value_enum, default_value = "filesystem-outbox")]
        adapter: DispatchAdapterArg,
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Clone, clap::ValueEnum)]
enum DispatchAdapterArg {
    FilesystemOutbox,
    Stdout,
}

impl From<DispatchAdapterArg> for ops_horizon::orchestrate::DispatchAdapter {
    fn from(arg: DispatchAdapterArg) -> Self {
        match arg {
            DispatchAdapterArg::FilesystemOutbox => ops_horizon::orchestrate::DispatchAdapter::FilesystemOutbox,
            DispatchAdapterArg::Stdout => ops_horizon::orchestrate::DispatchAdapter::Stdout,
        }
    }
}

#[derive(Subcommand)]
enum HorizonAckAction {
    Ingest {
        #[arg(long)]
        packet_id: String,
        #[arg(long)]
        trace_id: String,
        #[arg(long, value_enum)]
        to: PacketStatusArg,
        #[arg(long)]
        note: Option<String>,
    },
}

#[derive(Subcommand)]
enum HorizonRetryAction {
    Reconcile,
}

fn parse_payload(raw: &str) -> Result<Value, ExitError> {
    serde_json::from_str(raw).map_err(|e| ExitError::usage(format!("invalid --payload JSON: {e}")))
}

fn build_apply_request(
    intent: ApplyIntent,
    by: String,
    approval_ref: String,
    rationale: String,
    review_by: String,
    idempotency_key: String,
) -> ApplyRequest {
    ApplyRequest { intent, by, approval_ref, rationale, review_by, idempotency_key }
}

async fn run(cli: Cli) -> Result<Value, ExitError> {
    let repo_root = env::repo_root().map_err(|e| ExitError::usage(format!("resolving repo root: {e}")))?;
    let repo = Repo::new(repo_root);
    let config = OpsManagerConfig::load(cli.config.as_deref())?;
    let ctx = Ctx::new(repo, config);

    match cli.command {
        Command::Reconcile { loop_id, trace_id } => commands::reconcile::handle(&ctx, &loop_id, trace_id).await,
        Command::Status { loop_id } => commands::status::handle(&ctx, &loop_id).await,
        Command::Control { loop_id, intent, idempotency_key, trace_id, payload } => {
            let payload = parse_payload(&payload)?;
            commands::control::handle(&ctx, &loop_id, &intent, &idempotency_key, trace_id, payload).await
        }
        Command::FleetReconcile { trace_id, deterministic_order, max_parallel } => {
            commands::fleet::reconcile(&ctx, trace_id, deterministic_order, max_parallel).await
        }
        Command::FleetStatus => commands::fleet::status(&ctx),
        Command::FleetPolicy { trace_id } => commands::fleet::policy(&ctx, trace_id),
        Command::FleetHandoff { trace_id, execute, confirm, autonomous_execute } => {
            commands::fleet::handoff(&ctx, trace_id, execute, confirm, autonomous_execute).await
        }
        Command::AlertDispatch { loop_id } => commands::alerts::dispatch(&ctx, &loop_id).await,
        Command::PromotionGates { fail_on_hold } => commands::promotion::gates(&ctx, fail_on_hold),
        Command::PromotionApply { intent, by, approval_ref, rationale, review_by, idempotency_key } => {
            let request = build_apply_request(intent.into(), by, approval_ref, rationale, review_by, idempotency_key);
            commands::promotion::apply(&ctx, request).await
        }
        Command::PromotionOrchestrate { mode, intent, by, approval_ref, rationale, review_by, idempotency_key } => {
            let request = match intent {
                Some(intent) => Some(build_apply_request(
                    intent.into(),
                    by.ok_or_else(|| ExitError::usage("--by is required when an intent is given"))?,
                    approval_ref.ok_or_else(|| ExitError::usage("--approval-ref is required when an intent is given"))?,
                    rationale.ok_or_else(|| ExitError::usage("--rationale is required when an intent is given"))?,
                    review_by.ok_or_else(|| ExitError::usage("--review-by is required when an intent is given"))?,
                    idempotency_key.ok_or_else(|| ExitError::usage("--idempotency-key is required when an intent is given"))?,
                )),
                None => None,
            };
            commands::promotion::orchestrate(&ctx, mode.into(), request).await
        }
        Command::HorizonPacket { action } => match action {
            HorizonPacketAction::Create { horizon_ref, sender, recipient_type, recipient_id, intent, ttl_seconds, evidence_refs } => {
                let recipient = Recipient { recipient_type: recipient_type.into(), id: recipient_id };
                commands::horizon::packet_create(&ctx, horizon_ref, sender, recipient, intent, ttl_seconds, evidence_refs)
            }
            HorizonPacketAction::Transition { packet_id, to, note } => {
                commands::horizon::packet_transition(&ctx, &packet_id, to.into(), note)
            }
            HorizonPacketAction::List => commands::horizon::packet_list(&ctx),
            HorizonPacketAction::Show { packet_id } => commands::horizon::packet_show(&ctx, &packet_id),
        },
        Command::HorizonOrchestrate { action } => match action {
            HorizonOrchestrateAction::Plan => commands::horizon::orchestrate_plan(&ctx),
            HorizonOrchestrateAction::Dispatch { adapter, dry_run } => {
                commands::horizon::orchestrate_dispatch(&ctx, adapter.into(), dry_run)
            }
        },
        Command::HorizonAck { action } => match action {
            HorizonAckAction::Ingest { packet_id, trace_id, to, note } => {
                commands::horizon::ack_ingest(&ctx, packet_id, trace_id, to.into(), note)
            }
        },
        Command::HorizonRetry { action } => match action {
            HorizonRetryAction::Reconcile => commands::horizon::retry_reconcile(&ctx),
        },
        Command::HorizonBridge => commands::horizon::bridge_ingest(&ctx),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprint!("{err}");
            return ExitCode::from(exit_error::USAGE as u8);
        }
    };

    match run(cli).await {
        Ok(value) => match output::print_json(&value) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("{err}");
                ExitCode::from(err.code as u8)
            }
        },
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.code as u8)
        }
    }
}
