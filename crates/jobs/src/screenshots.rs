// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Screenshots from the first video of release content.

use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use relprep_core::{CacheArgs, Job, JobConfig, JobError, JobKind, JobStatus, Observers};
use relprep_daemon::{DaemonProcess, Spawn};

use crate::background::Background;
use crate::workers::{self, ScreenshotsArgs, ScreenshotsInfo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenshotsEvent {
    /// The video screenshots are taken from
    VideoFile(PathBuf),
    /// Final "H:MM:SS" positions
    Timestamps(Vec<String>),
}

#[derive(Debug, Default)]
struct Progress {
    video_file: Option<PathBuf>,
    timestamps: Vec<String>,
    total: Option<usize>,
    created: usize,
}

#[derive(Default)]
struct ScreenshotsState {
    progress: Mutex<Progress>,
    events: Observers<ScreenshotsEvent>,
}

impl ScreenshotsState {
    fn handle_info(&self, job: &Job, info: ScreenshotsInfo) {
        if job.is_finished() {
            return;
        }
        match info {
            ScreenshotsInfo::VideoFile(path) => {
                self.progress.lock().video_file = Some(path.clone());
                self.events.emit(&ScreenshotsEvent::VideoFile(path));
            }
            ScreenshotsInfo::Timestamps(timestamps) => {
                {
                    let mut progress = self.progress.lock();
                    progress.total = Some(timestamps.len());
                    progress.timestamps = timestamps.clone();
                }
                self.events.emit(&ScreenshotsEvent::Timestamps(timestamps));
            }
            ScreenshotsInfo::Screenshot(path) => {
                self.progress.lock().created += 1;
                job.send_if_not_finished(path.display());
            }
        }
    }
}

struct Screenshots {
    content_path: PathBuf,
    timestamps: Vec<String>,
    number: usize,
    spawn: Spawn,
    state: Arc<ScreenshotsState>,
    background: Background,
}

/// Creates PNG screenshots in the job's homedir and sends their paths.
///
/// Timestamps are "[[H:]M:]S" strings. If fewer than `number` are given,
/// positions are picked to spread the screenshots over the video.
pub struct ScreenshotsJob {
    job: Job,
    state: Arc<ScreenshotsState>,
}

impl ScreenshotsJob {
    pub fn new(config: JobConfig, content_path: impl Into<PathBuf>, timestamps: Vec<String>, number: usize) -> Self {
        Self::with_spawn(config, content_path, timestamps, number, Spawn::default())
    }

    pub fn with_spawn(
        config: JobConfig,
        content_path: impl Into<PathBuf>,
        timestamps: Vec<String>,
        number: usize,
        spawn: Spawn,
    ) -> Self {
        let state = Arc::new(ScreenshotsState::default());
        let kind = Screenshots {
            content_path: content_path.into(),
            timestamps,
            number,
            spawn,
            state: Arc::clone(&state),
            background: Background::default(),
        };
        Self { job: Job::new(config, Arc::new(kind)), state }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn on_event(&self, callback: impl Fn(&ScreenshotsEvent) + Send + Sync + 'static) {
        self.state.events.register(callback);
    }

    /// `None` until the video is found.
    pub fn video_file(&self) -> Option<PathBuf> {
        self.state.progress.lock().video_file.clone()
    }

    /// Empty until the timestamps are known.
    pub fn timestamps(&self) -> Vec<String> {
        self.state.progress.lock().timestamps.clone()
    }

    /// `None` until the timestamps are known.
    pub fn screenshots_total(&self) -> Option<usize> {
        self.state.progress.lock().total
    }

    pub fn screenshots_created(&self) -> usize {
        self.state.progress.lock().created
    }
}

impl Deref for ScreenshotsJob {
    type Target = Job;

    fn deref(&self) -> &Job {
        &self.job
    }
}

#[async_trait]
impl JobKind for Screenshots {
    fn name(&self) -> &str {
        "screenshots"
    }

    fn label(&self) -> &str {
        "Screenshots"
    }

    fn initialize(&self, job: &Job) {
        let args = ScreenshotsArgs {
            content_path: self.content_path.clone(),
            timestamps: self.timestamps.clone(),
            number: self.number,
            output_dir: job.homedir().to_path_buf(),
            overwrite: job.ignore_cache(),
        };
        let args = match serde_json::to_value(args) {
            Ok(args) => args,
            Err(e) => {
                job.abort(JobError::Other { job: job.name().to_string(), message: e.to_string() });
                return;
            }
        };

        let state = Arc::clone(&self.state);
        let on_info = job.downgrade();
        let on_error = job.downgrade();
        let on_finished = job.downgrade();
        let process = DaemonProcess::new(workers::SCREENSHOTS, workers::screenshots, args)
            .spawn(self.spawn)
            .on_info(move |data| {
                let Some(job) = on_info.upgrade() else {
                    return;
                };
                match serde_json::from_value::<ScreenshotsInfo>(data) {
                    Ok(info) => state.handle_info(&job, info),
                    Err(e) => tracing::warn!(job = job.name(), error = %e, "invalid info from worker"),
                }
            })
            .on_error(move |message| {
                if let Some(job) = on_error.upgrade() {
                    job.error_if_not_finished(message);
                }
            })
            .on_finished(move |_| {
                if let Some(job) = on_finished.upgrade() {
                    job.finish();
                }
            });
        self.background.set(process);
    }

    fn execute(&self, job: &Job) {
        self.background.start(job);
    }

    fn cache_args(&self) -> Option<CacheArgs> {
        Some(
            CacheArgs::new()
                .arg("content_path", self.content_path.display())
                .arg("timestamps", self.timestamps.join(","))
                .arg("number", self.number),
        )
    }

    fn finishing(&self, _job: &Job) {
        self.background.stop();
    }

    async fn joined(&self, job: &Job) -> Result<(), JobError> {
        self.background.join(job).await
    }

    /// Successful iff every planned screenshot was created. Without a plan
    /// (replayed from cache or cancelled before timestamps were known),
    /// any output counts as success.
    fn exit_code(&self, status: &JobStatus<'_>) -> i32 {
        let complete = match self.state.progress.lock().total {
            Some(total) => status.output.len() == total && status.errors.is_empty(),
            None => !status.output.is_empty(),
        };
        if complete && !status.failed {
            0
        } else {
            1
        }
    }
}

#[cfg(test)]
#[path = "screenshots_tests.rs"]
mod tests;
