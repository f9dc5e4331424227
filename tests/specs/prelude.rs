// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for specs.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// `kh` with a scrubbed environment and no fake kubectl.
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// A temp directory holding a fake `kubectl` script.
///
/// The script appends its argv to `calls.log` and its stdin (when the first
/// argument is `apply` or `create`) to `stdin.log` before running `body`.
pub struct FakeKubectl {
    dir: TempDir,
}

impl FakeKubectl {
    pub fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().display().to_string();
        let script = format!(
            "#!/bin/sh\n\
             echo \"$*\" >> '{root}/calls.log'\n\
             case \"$1\" in apply|create) cat >> '{root}/stdin.log'; echo >> '{root}/stdin.log';; esac\n\
             {body}\n"
        );
        let path = dir.path().join("kubectl");
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("kubectl")
    }

    /// `kh` wired to this script through `KH_KUBECTL`.
    pub fn kh(&self) -> CliBuilder {
        CliBuilder::new().env("KH_KUBECTL", self.path().display().to_string())
    }

    /// One entry per kubectl invocation, argv joined by spaces.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn stdin_log(&self) -> String {
        fs::read_to_string(self.dir.path().join("stdin.log")).unwrap_or_default()
    }
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    fn new() -> Self {
        let mut cmd = Command::cargo_bin("kh").unwrap_or_else(|e| {
            panic!("kh binary not found ({e}); run `cargo test --workspace` or `cargo build -p kh`")
        });
        for var in ["KH_KUBECTL", "KH_KIND", "KIND_CLUSTER", "KH_TOKEN_TIMEOUT_MS", "RUST_LOG"] {
            cmd.env_remove(var);
        }
        Self { cmd }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert::from(output);
        assert_eq!(run.code, Some(0), "expected success\nstdout: {}\nstderr: {}", run.stdout, run.stderr);
        run
    }

    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert::from(output);
        assert_ne!(run.code, Some(0), "expected failure\nstdout: {}", run.stdout);
        run
    }
}

pub struct RunAssert {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl From<std::process::Output> for RunAssert {
    fn from(output: std::process::Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl RunAssert {
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout missing {:?}:\n{}", needle, self.stdout);
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout, expected);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr missing {:?}:\n{}", needle, self.stderr);
        self
    }

    pub fn code_is(self, code: i32) -> Self {
        assert_eq!(self.code, Some(code), "stderr: {}", self.stderr);
        self
    }
}
