// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL event logs with 1-indexed line offsets, matching
//! `ops_core::model::Cursor::event_line_offset`. A cursor of `N` means the
//! first `N` lines have already been consumed; callers ask for everything
//! strictly after that.
//!
//! A missing file reads as zero lines rather than an error (a loop with no
//! events yet has no telemetry file on disk). A truncated trailing line
//! (the writer crashed mid-`write`) is skipped rather than failing the
//! whole read, since every prior line is still valid data that must not be
//! discarded.

use ops_core::error::{AppError, AppResult};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Append one JSON-encoded line. Opens in append mode so concurrent writers
/// to distinct files never interleave; same-file concurrent writers must be
/// serialized by the caller (see `ops_core::keyed_lock::KeyedMutex`).
pub fn append_line<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
    }
    let mut line = serde_json::to_string(value).map_err(AppError::from)?;
    line.push('\n');
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::io(path, e))?;
    file.write_all(line.as_bytes())
        .map_err(|e| AppError::io(path, e))?;
    Ok(())
}

/// Raw lines strictly after `since_offset` (1-indexed), paired with their
/// line number. A missing file yields an empty vec.
pub fn read_since(path: &Path, since_offset: u64) -> AppResult<Vec<(u64, String)>> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(AppError::io(path, e)),
    };
    let reader = BufReader::new(file);
    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx as u64 + 1;
        if line_no <= since_offset {
            continue;
        }
        let line = match line {
            Ok(line) => line,
            // A partial trailing write (no final newline flushed) surfaces
            // as an I/O error from `lines()` on some platforms; treat it
            // like an absent tail rather than aborting the whole read.
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        out.push((line_no, line));
    }
    Ok(out)
}

/// Like [`read_since`], but deserializes each line into `T`. A line that
/// fails to parse is skipped rather than aborting the batch, consistent
/// with the append-only log's no-discard-of-valid-data guarantee.
pub fn read_since_typed<T: DeserializeOwned>(
    path: &Path,
    since_offset: u64,
) -> AppResult<Vec<(u64, T)>> {
    let raw = read_since(path, since_offset)?;
    let mut out = Vec::with_capacity(raw.len());
    for (line_no, line) in raw {
        if let Ok(value) = serde_json::from_str(&line) {
            out.push((line_no, value));
        }
    }
    Ok(out)
}

/// Total number of complete (non-empty) lines currently in the file. Used
/// to seed a fresh cursor for a file that already has history.
pub fn line_count(path: &Path) -> AppResult<u64> {
    Ok(read_since(path, 0)?.len() as u64)
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;
