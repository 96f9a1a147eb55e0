// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wrappers around `ffprobe`, `ffmpeg` and `mediainfo`.
//!
//! `duration` and `screenshot` block and are meant for worker threads;
//! `mediainfo` is async.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::content::{self, ContentError};

/// Screenshot could not be created
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ScreenshotError(pub String);

impl From<ContentError> for ScreenshotError {
    fn from(e: ContentError) -> Self {
        ScreenshotError(e.0)
    }
}

/// `mediainfo` could not produce a report
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MediainfoError(pub String);

impl From<ContentError> for MediainfoError {
    fn from(e: ContentError) -> Self {
        MediainfoError(e.0)
    }
}

fn spawn_reason(program: &OsStr, e: &std::io::Error) -> String {
    let program = program.to_string_lossy();
    if e.kind() == std::io::ErrorKind::NotFound {
        format!("{program}: Not installed")
    } else {
        format!("{program}: {e}")
    }
}

/// Path as understood by ffmpeg; Blu-ray directories need a protocol prefix.
pub fn ffmpeg_input(path: &Path) -> String {
    if path.join("BDMV").exists() {
        format!("bluray:{}", path.display())
    } else {
        path.display().to_string()
    }
}

/// Video duration in seconds according to `ffprobe`.
pub fn duration(video: &Path) -> Result<f64, ContentError> {
    let program = crate::env::ffprobe();
    let output = Command::new(&program)
        .args(["-v", "error", "-show_entries", "format=duration"])
        .args(["-of", "default=noprint_wrappers=1:nokey=1"])
        .arg(ffmpeg_input(video))
        .output()
        .map_err(|e| ContentError(spawn_reason(&program, &e)))?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    match stdout.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs > 0.0 => Ok(secs),
        _ => {
            tracing::debug!(video = %video.display(), stdout = %stdout.trim(), "unexpected ffprobe output");
            Err(ContentError::new(video, "Unable to determine video duration"))
        }
    }
}

/// Screenshot file name for `video` at `timestamp` inside `dir`.
pub fn screenshot_path(dir: &Path, video: &Path, timestamp: &str) -> PathBuf {
    dir.join(format!("{}.{timestamp}.png", content::basename(video)))
}

/// Save the frame of `video` at `timestamp` as PNG to `output`.
///
/// Nothing is done if `output` exists and `overwrite` is false.
pub fn screenshot(
    video: &Path,
    timestamp: &str,
    output: &Path,
    overwrite: bool,
) -> Result<(), ScreenshotError> {
    if !video.join("BDMV").is_dir() {
        content::assert_file_readable(video)?;
    }
    if !overwrite && output.exists() {
        tracing::debug!(output = %output.display(), "screenshot already exists");
        return Ok(());
    }

    let program = crate::env::ffmpeg();
    let result = Command::new(&program)
        .args(["-y", "-loglevel", "level+error"])
        .args(["-ss", timestamp])
        .arg("-i")
        .arg(ffmpeg_input(video))
        .args(["-vframes", "1"])
        // Use correct aspect ratio
        .args(["-vf", "scale=trunc(ih*dar):ih,setsar=1/1"])
        .arg(format!("file:{}", output.display()))
        .output()
        .map_err(|e| ScreenshotError(spawn_reason(&program, &e)))?;

    if !output.exists() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let stdout = String::from_utf8_lossy(&result.stdout);
        let details = format!("{}{}", stdout.trim(), stderr.trim());
        return Err(ScreenshotError(format!(
            "{}: Failed to create screenshot at {timestamp}: {details}",
            video.display()
        )));
    }
    Ok(())
}

/// `mediainfo` report for the first video in `content` with the parent
/// directory of `content` removed from all paths.
pub async fn mediainfo(content_path: &Path) -> Result<String, MediainfoError> {
    let path = content_path.to_path_buf();
    let video = tokio::task::spawn_blocking(move || content::first_video(&path))
        .await
        .map_err(|e| MediainfoError(e.to_string()))??;

    let program = crate::env::mediainfo();
    let output = tokio::process::Command::new(&program)
        .arg(&video)
        .output()
        .await
        .map_err(|e| MediainfoError(spawn_reason(&program, &e)))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MediainfoError(format!(
            "{}: {}",
            program.to_string_lossy(),
            stderr.trim()
        )));
    }

    let report = String::from_utf8_lossy(&output.stdout).into_owned();
    Ok(redact_parent(&report, content_path))
}

fn redact_parent(report: &str, content_path: &Path) -> String {
    match content_path.parent().map(|p| p.display().to_string()) {
        Some(parent) if !parent.is_empty() => {
            report.replace(&format!("{parent}{}", std::path::MAIN_SEPARATOR), "")
        }
        _ => report.to_string(),
    }
}

#[cfg(test)]
#[path = "media_tests.rs"]
mod tests;
