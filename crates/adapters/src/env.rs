// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::ffi::OsString;

fn program(var: &str, default: &str) -> OsString {
    std::env::var_os(var).filter(|s| !s.is_empty()).unwrap_or_else(|| default.into())
}

/// RELPREP_FFMPEG > `ffmpeg` from PATH
pub fn ffmpeg() -> OsString {
    program("RELPREP_FFMPEG", "ffmpeg")
}

/// RELPREP_FFPROBE > `ffprobe` from PATH
pub fn ffprobe() -> OsString {
    program("RELPREP_FFPROBE", "ffprobe")
}

/// RELPREP_MEDIAINFO > `mediainfo` from PATH
pub fn mediainfo() -> OsString {
    program("RELPREP_MEDIAINFO", "mediainfo")
}
