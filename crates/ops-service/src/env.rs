// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the service binary.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Repo root the service reads/writes through. Defaults to the current
/// working directory so `ops-manager-service` and `ops-manager` agree on
/// layout without extra flags when run from the same checkout.
pub fn repo_root() -> std::io::Result<PathBuf> {
    match std::env::var("OPS_MANAGER_REPO_ROOT") {
        Ok(dir) => Ok(PathBuf::from(dir)),
        Err(_) => std::env::current_dir(),
    }
}

/// Address the HTTP server binds to. Defaults to loopback on 8080.
pub fn bind_addr() -> SocketAddr {
    std::env::var("OPS_MANAGER_SERVICE_BIND_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)))
}
