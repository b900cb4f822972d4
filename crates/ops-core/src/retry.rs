// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared retry/backoff policy object.
//!
//! Design Note 9 calls out the source's "ad-hoc retries and sleeps" as
//! needing centralization. A single [`BackoffPolicy`] is shared by the
//! horizon retry subsystem (spec §4.10) and the `sprite_service` transport
//! client's control-call retries (spec §4.4). Delay computation is pure so
//! it can be unit-tested without ever sleeping.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BackoffPolicy {
    pub base_delay_seconds: u64,
    pub max_delay_seconds: u64,
    pub max_attempts: u32,
    /// Additive jitter ceiling in seconds; actual jitter is deterministic
    /// (`attempt % (jitter_seconds + 1)`) rather than random, so retry
    /// schedules stay reproducible in tests.
    #[serde(default)]
    pub jitter_seconds: u64,
}

impl BackoffPolicy {
    pub const fn new(base_delay_seconds: u64, max_delay_seconds: u64, max_attempts: u32) -> Self {
        Self {
            base_delay_seconds,
            max_delay_seconds,
            max_attempts,
            jitter_seconds: 0,
        }
    }

    pub const fn with_jitter(mut self, jitter_seconds: u64) -> Self {
        self.jitter_seconds = jitter_seconds;
        self
    }

    /// Exponential backoff: `base * 2^attempt`, clamped to `max_delay`, plus
    /// deterministic jitter keyed off `attempt`.
    pub fn next_delay(&self, attempt: u32) -> Duration {
        let exp = self.base_delay_seconds.saturating_mul(1u64 << attempt.min(32));
        let base = exp.min(self.max_delay_seconds);
        let jitter = if self.jitter_seconds == 0 {
            0
        } else {
            u64::from(attempt) % (self.jitter_seconds + 1)
        };
        Duration::from_secs(base.saturating_add(jitter))
    }

    /// Whether a caller may attempt again after `attempts_so_far` tries.
    pub fn should_retry(&self, attempts_so_far: u32) -> bool {
        attempts_so_far < self.max_attempts
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(1, 30, 5)
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
