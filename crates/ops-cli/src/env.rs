// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI binary.

use std::path::PathBuf;

/// Repo root the CLI reads/writes through. Defaults to the current
/// working directory, matching `ops-manager-service` (spec §6: both
/// processes agree on the file layout rooted at the same directory).
pub fn repo_root() -> std::io::Result<PathBuf> {
    match std::env::var("OPS_MANAGER_REPO_ROOT") {
        Ok(dir) => Ok(PathBuf::from(dir)),
        Err(_) => std::env::current_dir(),
    }
}

/// Path to the alert sinks TOML file (spec §4.8); no on-disk default,
/// since an unset value means "no sinks configured" rather than a
/// missing-config error.
pub fn alert_sinks_file() -> Option<PathBuf> {
    std::env::var("OPS_MANAGER_ALERT_SINKS_FILE").ok().map(PathBuf::from)
}
