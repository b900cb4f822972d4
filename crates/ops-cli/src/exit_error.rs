// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type that carries a process exit code.
//!
//! Command handlers return `ExitError` instead of calling
//! `std::process::exit()` directly, so `main()` owns process
//! termination and every handler's failure path is just `?`.
//!
//! Codes follow the CLI surface contract: 0 success, 1 usage/validation
//! error, 2 gated hold or contract-validation failure, 7 policy decision
//! mismatch (an apply refused because the gates did not decide promote).

use std::fmt;

use ops_core::error::AppError;

pub const USAGE: i32 = 1;
pub const GATED_HOLD: i32 = 2;
pub const POLICY_DECISION_MISMATCH: i32 = 7;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }

    pub fn gated_hold(message: impl Into<String>) -> Self {
        Self::new(GATED_HOLD, message)
    }

    pub fn policy_decision_mismatch(message: impl Into<String>) -> Self {
        Self::new(POLICY_DECISION_MISMATCH, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

/// Bridge/packet FSM contract violations are their own exit code (2);
/// everything else an inner crate surfaces is treated as a usage or
/// input-validation failure (1). Commands that need code 2 or 7 for a
/// `Validation` error construct `ExitError` directly instead of going
/// through this conversion.
impl From<AppError> for ExitError {
    fn from(err: AppError) -> Self {
        match &err {
            AppError::Contract { .. } => Self::gated_hold(err.to_string()),
            _ => Self::usage(err.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;
