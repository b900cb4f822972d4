// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level error type for the ops-manager control plane.
//!
//! Every subsystem's local error type converts into [`AppError`] at its
//! public boundary. Variants mirror the error-kind taxonomy of spec §7:
//! validation, contract, transport, safety-block, state-regression, and
//! idempotency-replay (the last is explicitly *not* an error and has no
//! variant here — see `ops_transport::ControlOutcome::replayed`).

use std::path::PathBuf;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration or envelope failed validation. Rejects the whole
    /// artifact; never partial.
    #[error("validation failed for {field}: {message}")]
    Validation { field: String, message: String },

    /// A required envelope field was missing or malformed (bridge/ingest
    /// contract violations).
    #[error("contract violation: {message}")]
    Contract { message: String },

    /// Timeout, auth failure, network error, or HTTP >= 400 from a remote
    /// transport.
    #[error("transport unreachable: {message}")]
    Transport { message: String },

    /// Cursor or sequence-number monotonicity violated.
    #[error("state regression detected: {message}")]
    StateRegression { message: String },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn contract(message: impl Into<String>) -> Self {
        Self::Contract {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn state_regression(message: impl Into<String>) -> Self {
        Self::StateRegression {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error should abort an entire fleet/batch invocation
    /// (config errors) versus being captured per-item (transport/validation
    /// failures local to one loop, per spec §7 propagation policy).
    pub fn is_fatal_to_invocation(&self) -> bool {
        matches!(self, AppError::Toml(_))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
