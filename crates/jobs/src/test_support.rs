// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixtures shared by the job tests.

use std::path::{Path, PathBuf};

use relprep_adapters::test_support::{fake_ffmpeg, fake_ffprobe, fake_mediainfo};

/// Sets an environment variable until dropped. Use in `#[serial]` tests.
pub struct EnvGuard(&'static str);

impl EnvGuard {
    pub fn set(var: &'static str, value: &Path) -> Self {
        std::env::set_var(var, value);
        EnvGuard(var)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        std::env::remove_var(self.0);
    }
}

/// Point all media tools at stand-in scripts in `dir`.
pub fn fake_media_tools(dir: &Path, duration: f64) -> Vec<EnvGuard> {
    vec![
        EnvGuard::set("RELPREP_FFPROBE", &fake_ffprobe(dir, duration)),
        EnvGuard::set("RELPREP_FFMPEG", &fake_ffmpeg(dir)),
        EnvGuard::set("RELPREP_MEDIAINFO", &fake_mediainfo(dir)),
    ]
}

/// `<dir>/<name>` filled with a few bytes.
pub fn video_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, b"not really a video").unwrap();
    path
}
