// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stand-in shell scripts for the external media tools.
//!
//! Point `RELPREP_FFPROBE`, `RELPREP_FFMPEG` or `RELPREP_MEDIAINFO` at the
//! returned paths (in `#[serial]` tests).

#![allow(clippy::unwrap_used)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// `ffprobe` reporting `seconds` for every file
pub fn fake_ffprobe(dir: &Path, seconds: f64) -> PathBuf {
    write_script(dir, "ffprobe", &format!("echo {seconds}"))
}

/// `ffmpeg` writing a dummy PNG to the `file:` output argument
pub fn fake_ffmpeg(dir: &Path) -> PathBuf {
    write_script(dir, "ffmpeg", "for last; do :; done\nprintf 'png' > \"${last#file:}\"")
}

/// `ffmpeg` failing for timestamps in `bad`, working otherwise
pub fn flaky_ffmpeg(dir: &Path, bad: &str) -> PathBuf {
    write_script(
        dir,
        "ffmpeg",
        &format!(
            "for last; do :; done\n\
             case \"$*\" in *\"-ss {bad} \"*) echo 'Invalid frame' >&2; exit 1;; esac\n\
             printf 'png' > \"${{last#file:}}\""
        ),
    )
}

/// `mediainfo` printing the full path it was called with
pub fn fake_mediainfo(dir: &Path) -> PathBuf {
    write_script(dir, "mediainfo", "echo \"General\"\necho \"Complete name : $1\"")
}
