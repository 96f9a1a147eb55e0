// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker functions run through [`relprep_daemon::DaemonProcess`].
//!
//! Domain errors are reported with [`Outbox::error`] and don't end the
//! worker. A returned `Err` means the worker itself broke.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use relprep_adapters::{content, media, ScreenshotError};
use relprep_daemon::{Inbox, Outbox, WorkerError, WorkerRegistry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::metainfo::{self, CreateOptions};
use crate::timestamp;

pub const CREATE_TORRENT: &str = "create-torrent";
pub const SCREENSHOTS: &str = "screenshots";

/// Minimum time between two progress messages; 100% is always sent.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Every worker this crate provides, for the hidden `worker` subcommand.
pub fn registry() -> WorkerRegistry {
    WorkerRegistry::new().register(CREATE_TORRENT, create_torrent).register(SCREENSHOTS, screenshots)
}

/// Hash content and write a torrent file.
///
/// Init: file tree. Info: percent done. Result: torrent path.
pub fn create_torrent(outbox: &Outbox, inbox: &Inbox, args: Value) -> Result<(), WorkerError> {
    let options: CreateOptions = serde_json::from_value(args)?;
    let mut last_report: Option<Instant> = None;

    let created = metainfo::create(
        &options,
        |tree| {
            if let Err(e) = outbox.init(tree) {
                tracing::debug!(error = %e, "failed to send file tree");
            }
        },
        |percent| {
            if inbox.shall_terminate() {
                return false;
            }
            let due = percent >= 100.0 || last_report.map_or(true, |at| at.elapsed() >= PROGRESS_INTERVAL);
            if !due {
                return true;
            }
            last_report = Some(Instant::now());
            outbox.info(percent).is_ok()
        },
    );

    match created {
        Ok(Some(path)) => outbox.result(Some(serde_json::to_value(path)?)),
        Ok(None) => Ok(()),
        Err(e) => outbox.error(e),
    }
}

/// Worker arguments for [`screenshots`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotsArgs {
    pub content_path: PathBuf,
    pub timestamps: Vec<String>,
    pub number: usize,
    pub output_dir: PathBuf,
    pub overwrite: bool,
}

/// Info messages of the [`screenshots`] worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScreenshotsInfo {
    VideoFile(PathBuf),
    Timestamps(Vec<String>),
    Screenshot(PathBuf),
}

/// Find the video, pick timestamps and create one screenshot per timestamp.
pub fn screenshots(outbox: &Outbox, inbox: &Inbox, args: Value) -> Result<(), WorkerError> {
    let args: ScreenshotsArgs = serde_json::from_value(args)?;

    let video = match content::first_video(&args.content_path) {
        Ok(video) => video,
        Err(e) => return outbox.error(e),
    };
    if inbox.shall_terminate() {
        return Ok(());
    }
    outbox.info(ScreenshotsInfo::VideoFile(video.clone()))?;

    let duration = match media::duration(&video) {
        Ok(duration) => duration,
        Err(e) => return outbox.error(e),
    };
    let timestamps = match timestamp::normalize(duration, &args.timestamps, args.number) {
        Ok(timestamps) => timestamps,
        Err(e) => return outbox.error(e),
    };
    outbox.info(ScreenshotsInfo::Timestamps(timestamps.clone()))?;

    for ts in &timestamps {
        if inbox.shall_terminate() {
            tracing::debug!(timestamp = %ts, "screenshots cancelled");
            return Ok(());
        }
        match screenshot(&args, &video, duration, ts) {
            Ok(path) => outbox.info(ScreenshotsInfo::Screenshot(path))?,
            Err(e) => outbox.error(e)?,
        }
    }
    Ok(())
}

fn screenshot(args: &ScreenshotsArgs, video: &Path, duration: f64, ts: &str) -> Result<PathBuf, ScreenshotError> {
    let seconds = timestamp::parse(ts).map_err(|e| ScreenshotError(e.to_string()))?;
    if seconds >= duration {
        return Err(ScreenshotError(format!(
            "Timestamp is after video end ({}): {ts}",
            timestamp::pretty(duration)
        )));
    }
    let path = media::screenshot_path(&args.output_dir, video, ts);
    media::screenshot(video, ts, &path, args.overwrite)?;
    Ok(path)
}

#[cfg(test)]
#[path = "workers_tests.rs"]
mod tests;
