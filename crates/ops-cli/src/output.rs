// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output helper: every command prints exactly one JSON document on
//! stdout (spec §6/§7 user-visible behavior), so there is no `--format`
//! toggle to thread through command handlers.

use serde::Serialize;

use crate::exit_error::ExitError;

pub fn print_json<T: Serialize>(value: &T) -> Result<(), ExitError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| ExitError::usage(e.to_string()))?;
    println!("{text}");
    Ok(())
}
