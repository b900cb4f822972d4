// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Whole-file JSON snapshots, written temp-then-rename for atomicity.
//! Readers treat a missing or empty file as "absent" rather than an error,
//! so first-reconcile and fresh-repo code paths need no special casing.

use ops_core::error::{AppError, AppResult};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::Path;

/// Read and deserialize a JSON file. Returns `Ok(None)` if the file does
/// not exist or is empty/whitespace-only.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<Option<T>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(AppError::io(path, e)),
    };
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&text).map(Some).map_err(AppError::from)
}

/// Serialize `value` and write it atomically: write to `<path>.tmp-<pid>`
/// in the same directory, then rename over `path`. The same-directory temp
/// file guarantees the rename is same-filesystem (and thus atomic on every
/// platform this runs on).
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
    }
    let body = serde_json::to_vec_pretty(value).map_err(AppError::from)?;
    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, &body).map_err(|e| AppError::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| AppError::io(path, e))?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> std::path::PathBuf {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("artifact.json");
    path.with_file_name(format!(".{file_name}.tmp-{}", std::process::id()))
}

#[cfg(test)]
#[path = "atomic_json_tests.rs"]
mod tests;
