// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Create a torrent file for release content.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use relprep_adapters::basename;
use relprep_core::{CacheArgs, Job, JobConfig, JobError, JobKind, Observers};
use relprep_daemon::{DaemonProcess, Spawn};
use serde_json::Value;

use crate::background::Background;
use crate::metainfo::{self, CreateOptions, FileNode};
use crate::workers;

/// Tracker-specific torrent settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tracker {
    /// Short name, used in the torrent file name
    pub name: String,
    pub announce: String,
    pub source: Option<String>,
    /// Regular expressions for files to leave out
    pub exclude: Vec<String>,
}

#[derive(Default)]
struct TorrentState {
    file_tree: Mutex<String>,
    progress: Observers<f64>,
}

struct CreateTorrent {
    content_path: PathBuf,
    torrent_path: PathBuf,
    tracker: Tracker,
    spawn: Spawn,
    state: Arc<TorrentState>,
    background: Background,
}

/// Hashes content in a worker and sends the torrent file path.
///
/// An existing torrent file is reused unless the cache is ignored.
pub struct CreateTorrentJob {
    job: Job,
    torrent_path: PathBuf,
    state: Arc<TorrentState>,
}

impl CreateTorrentJob {
    pub fn new(config: JobConfig, content_path: impl Into<PathBuf>, tracker: Tracker) -> Self {
        Self::with_spawn(config, content_path, tracker, Spawn::default())
    }

    pub fn with_spawn(
        config: JobConfig,
        content_path: impl Into<PathBuf>,
        tracker: Tracker,
        spawn: Spawn,
    ) -> Self {
        let content_path = content_path.into();
        let torrent_path = config.homedir.join(format!(
            "{}.{}.torrent",
            basename(&content_path),
            tracker.name.to_lowercase()
        ));
        let state = Arc::new(TorrentState::default());
        let kind = CreateTorrent {
            content_path,
            torrent_path: torrent_path.clone(),
            tracker,
            spawn,
            state: Arc::clone(&state),
            background: Background::default(),
        };
        Self { job: Job::new(config, Arc::new(kind)), torrent_path, state }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    /// `<homedir>/<content name>.<tracker>.torrent`
    pub fn torrent_path(&self) -> &Path {
        &self.torrent_path
    }

    /// Called with the percentage of hashed content.
    pub fn on_progress(&self, callback: impl Fn(f64) + Send + Sync + 'static) {
        self.state.progress.register(move |percent| callback(*percent));
    }
}

impl Deref for CreateTorrentJob {
    type Target = Job;

    fn deref(&self) -> &Job {
        &self.job
    }
}

impl CreateTorrent {
    fn options(&self, job: &Job) -> CreateOptions {
        CreateOptions {
            content_path: self.content_path.clone(),
            torrent_path: self.torrent_path.clone(),
            overwrite: job.ignore_cache(),
            announce: self.tracker.announce.clone(),
            source: self.tracker.source.clone(),
            exclude: self.tracker.exclude.clone(),
        }
    }
}

#[async_trait]
impl JobKind for CreateTorrent {
    fn name(&self) -> &str {
        "create-torrent"
    }

    fn label(&self) -> &str {
        "Create Torrent"
    }

    fn initialize(&self, job: &Job) {
        let args = match serde_json::to_value(self.options(job)) {
            Ok(args) => args,
            Err(e) => {
                job.abort(JobError::Other { job: job.name().to_string(), message: e.to_string() });
                return;
            }
        };

        let tree_state = Arc::clone(&self.state);
        let progress_state = Arc::clone(&self.state);
        let on_error = job.downgrade();
        let on_finished = job.downgrade();
        let process = DaemonProcess::new(workers::CREATE_TORRENT, workers::create_torrent, args)
            .spawn(self.spawn)
            .on_init(move |tree| match serde_json::from_value::<Vec<FileNode>>(tree) {
                Ok(tree) => *tree_state.file_tree.lock() = metainfo::render_tree(&tree),
                Err(e) => tracing::warn!(error = %e, "invalid file tree from worker"),
            })
            .on_info(move |progress| {
                if let Some(percent) = progress.as_f64() {
                    progress_state.progress.emit(&percent);
                }
            })
            .on_error(move |message| {
                if let Some(job) = on_error.upgrade() {
                    job.error_if_not_finished(message);
                }
            })
            .on_finished(move |result| {
                let Some(job) = on_finished.upgrade() else {
                    return;
                };
                tracing::debug!(job = job.name(), torrent = ?result, "torrent worker finished");
                if let Some(path) = result.as_ref().and_then(Value::as_str) {
                    job.send_if_not_finished(path);
                }
                job.finish();
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
                .arg("tracker_name", &self.tracker.name),
        )
    }

    fn finishing(&self, _job: &Job) {
        self.background.stop();
    }

    async fn joined(&self, job: &Job) -> Result<(), JobError> {
        self.background.join(job).await
    }

    fn info(&self) -> String {
        self.state.file_tree.lock().clone()
    }
}

#[cfg(test)]
#[path = "create_torrent_tests.rs"]
mod tests;
