// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shared data model (spec §3). Every entity here is persisted as
//! append-only JSON lines or whole-file JSON snapshots under a per-repo
//! directory; see [`crate::repo::Repo`] for path derivation.

pub mod envelope;
pub mod handoff;
pub mod health;
pub mod horizon;
pub mod policy;
pub mod projection;
pub mod registry;
pub mod sequence;
pub mod snapshot;

pub use envelope::{Envelope, SchemaVersion, Sequence};
pub use handoff::{HandoffIntent, HandoffStatus};
pub use health::{Health, HealthStatus, ReasonCode, ThresholdProfile, Thresholds};
pub use horizon::{
    HorizonPacket, PacketStatus, Recipient, RecipientType, Transition as PacketTransition,
};
pub use policy::{AutonomyClassification, PolicyCandidate, SuppressionScope};
pub use projection::{Confidence, DivergenceFlags, ProjectedState, Transition};
pub use registry::{AutonomousPolicy, FleetRegistry, LoopEntry, PolicyMode, RolloutConfig, SafetyConfig};
pub use sequence::SequenceState;
pub use snapshot::{Cursor, LoopRunEvent, LoopRunSnapshot, LoopStatus};
