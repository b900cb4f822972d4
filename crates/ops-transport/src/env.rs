// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the transport crate.

/// Token the `sprite_service` client sends as `X-Ops-Token` and the
/// service-side adapter (used by `ops-service`) validates incoming
/// requests against.
pub fn service_token() -> Option<String> {
    std::env::var("OPS_MANAGER_SERVICE_TOKEN")
        .ok()
        .filter(|s| !s.is_empty())
}

/// Path to an injected actuator script the `local` transport's `control`
/// operation shells out to. Test-only indirection (spec §6 Environment);
/// production deployments wire this to the real control actuator.
pub fn control_script() -> Option<String> {
    std::env::var("OPS_MANAGER_CONTROL_SCRIPT")
        .ok()
        .filter(|s| !s.is_empty())
}
