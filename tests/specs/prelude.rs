// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test scaffolding for the workspace's end-to-end specs: a
//! `Project` temp directory wired to the `ops-manager` binary, plus
//! `.passes()`/`.fails()` assertion helpers over `assert_cmd::Command`.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use ops_core::repo::Repo;

pub struct Project {
    dir: tempfile::TempDir,
}

pub struct Finished {
    output: std::process::Output,
}

impl Project {
    pub fn empty() -> Self {
        Self { dir: tempfile::tempdir().expect("tempdir") }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn repo(&self) -> Repo {
        Repo::new(self.dir.path())
    }

    /// A fresh `assert_cmd::Command` for the `ops-manager` binary, rooted
    /// at this project's directory.
    pub fn ops_manager(&self) -> Command {
        let mut cmd = Command::cargo_bin("ops-manager").expect("ops-manager binary");
        cmd.env("OPS_MANAGER_REPO_ROOT", self.dir.path());
        cmd.env_remove("OPS_MANAGER_ALERT_SINKS_FILE");
        cmd.env_remove("OPS_MANAGER_CONTROL_SCRIPT");
        cmd
    }

    pub fn write_json<T: serde::Serialize>(&self, path: PathBuf, value: &T) {
        ops_storage::atomic_json::write_json_atomic(&path, value).expect("seed fixture");
    }
}

pub trait CommandExt {
    fn run(self) -> Finished;
    fn passes(self) -> Finished;
    fn fails(self) -> Finished;
}

impl CommandExt for Command {
    fn run(mut self) -> Finished {
        let output = self.output().expect("spawn ops-manager");
        Finished { output }
    }

    fn passes(self) -> Finished {
        let finished = self.run();
        assert!(
            finished.output.status.success(),
            "expected success, got {:?}\nstdout: {}\nstderr: {}",
            finished.output.status.code(),
            finished.stdout(),
            finished.stderr(),
        );
        finished
    }

    fn fails(self) -> Finished {
        let finished = self.run();
        assert!(
            !finished.output.status.success(),
            "expected failure, got success\nstdout: {}",
            finished.stdout(),
        );
        finished
    }
}

impl Finished {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout()).unwrap_or_else(|e| {
            panic!("stdout was not JSON: {e}\nstdout: {}\nstderr: {}", self.stdout(), self.stderr())
        })
    }

    pub fn exit_code(&self) -> i32 {
        self.output.status.code().expect("process exited via a signal, not a status code")
    }
}
