// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for CLI specs

use std::path::{Path, PathBuf};

pub use relprep_adapters::test_support::{fake_ffmpeg, fake_ffprobe, fake_mediainfo};

/// Scratch directory the binary runs in.
///
/// The config file defaults to `<project>/config.toml`, which doesn't exist
/// until [`Project::config`] writes it.
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self { dir: tempfile::tempdir().unwrap() }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn file(&self, rel: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn dir(&self, rel: &str) -> PathBuf {
        let path = self.path().join(rel);
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn config(&self, toml: &str) -> PathBuf {
        self.file("config.toml", toml)
    }

    /// `relprep` running in this project
    pub fn relprep(&self) -> Cli {
        let mut cli = cli();
        cli.cmd.current_dir(self.path()).env("RELPREP_CONFIG", self.path().join("config.toml"));
        cli
    }

    /// `relprep` with stand-in media tools
    pub fn relprep_with_media_tools(&self, duration: f64) -> Cli {
        let bin = self.dir("bin");
        let mut cli = self.relprep();
        cli.cmd
            .env("RELPREP_FFPROBE", fake_ffprobe(&bin, duration))
            .env("RELPREP_FFMPEG", fake_ffmpeg(&bin))
            .env("RELPREP_MEDIAINFO", fake_mediainfo(&bin));
        cli
    }
}

pub struct Cli {
    cmd: assert_cmd::Command,
}

/// The `relprep` binary next to this test in the workspace target dir.
///
/// The binary belongs to another workspace member, so cargo doesn't set
/// `CARGO_BIN_EXE_relprep` for the specs.
pub fn relprep_bin() -> PathBuf {
    if let Some(path) = option_env!("CARGO_BIN_EXE_relprep") {
        return PathBuf::from(path);
    }
    let exe = std::env::current_exe().unwrap();
    let mut dir = exe.parent().unwrap();
    if dir.ends_with("deps") {
        dir = dir.parent().unwrap();
    }
    let bin = dir.join(format!("relprep{}", std::env::consts::EXE_SUFFIX));
    assert!(bin.is_file(), "{} not built; run `cargo test --workspace`", bin.display());
    bin
}

/// `relprep` with a clean environment
pub fn cli() -> Cli {
    let mut cmd = assert_cmd::Command::new(relprep_bin());
    for var in ["RELPREP_LOG", "RELPREP_CONFIG", "RELPREP_WORKER_EXE", "NO_COLOR", "COLOR"] {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    Cli { cmd }
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    fn output(mut self) -> (Option<i32>, Output) {
        let output = self.cmd.output().unwrap();
        let code = output.status.code();
        (
            code,
            Output {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
        )
    }

    pub fn passes(self) -> Output {
        let (code, output) = self.output();
        assert_eq!(code, Some(0), "expected success\n{output}");
        output
    }

    pub fn fails(self) -> Output {
        let (code, output) = self.output();
        assert!(code.is_some_and(|c| c != 0), "expected failure\n{output}");
        output
    }

    pub fn fails_with(self, expected: i32) -> Output {
        let (code, output) = self.output();
        assert_eq!(code, Some(expected), "unexpected exit code\n{output}");
        output
    }
}

pub struct Output {
    pub stdout: String,
    pub stderr: String,
}

impl std::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "--- stdout ---\n{}\n--- stderr ---\n{}", self.stdout, self.stderr)
    }
}

impl Output {
    pub fn stdout_has(self, text: &str) -> Self {
        assert!(self.stdout.contains(text), "stdout lacks {text:?}\n{self}");
        self
    }

    pub fn stdout_lacks(self, text: &str) -> Self {
        assert!(!self.stdout.contains(text), "stdout has {text:?}\n{self}");
        self
    }

    pub fn stderr_has(self, text: &str) -> Self {
        assert!(self.stderr.contains(text), "stderr lacks {text:?}\n{self}");
        self
    }

    pub fn stdout_lines(&self) -> Vec<&str> {
        self.stdout.lines().collect()
    }
}
