// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Copy torrent files somewhere else, e.g. a client's watch directory.

use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use relprep_adapters::{basename, MAX_TORRENT_SIZE};
use relprep_core::{CacheArgs, Job, JobConfig, JobError, JobKind, Observers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyTorrentEvent {
    Copying(PathBuf),
    /// Path of the new copy
    Copied(PathBuf),
}

struct CopyTorrent {
    destination: PathBuf,
    files: Vec<PathBuf>,
    events: Observers<CopyTorrentEvent>,
}

/// Copies incoming files to a destination and sends the new paths.
///
/// If copying fails, the original path is sent instead so downstream jobs
/// still get a usable file. Output is never cached.
pub struct CopyTorrentJob {
    job: Job,
    kind: Arc<CopyTorrent>,
}

impl CopyTorrentJob {
    /// `destination` is a directory or a file path. With `files`, everything
    /// is copied right away and the job is finished before it is started.
    pub fn new(config: JobConfig, destination: impl Into<PathBuf>, files: Vec<PathBuf>) -> Self {
        let kind = Arc::new(CopyTorrent {
            destination: destination.into(),
            files,
            events: Observers::new(),
        });
        Self { job: Job::new(config, Arc::clone(&kind)), kind }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn on_event(&self, callback: impl Fn(&CopyTorrentEvent) + Send + Sync + 'static) {
        self.kind.events.register(callback);
    }
}

impl Deref for CopyTorrentJob {
    type Target = Job;

    fn deref(&self) -> &Job {
        &self.job
    }
}

impl CopyTorrent {
    fn copy(&self, job: &Job, file: &Path) -> Result<(), JobError> {
        tracing::debug!(job = job.name(), file = %file.display(), destination = %self.destination.display(), "copying");
        let metadata = match fs::metadata(file) {
            Ok(metadata) => metadata,
            Err(_) => return job.error(format!("{}: No such file", file.display())),
        };
        if metadata.len() > MAX_TORRENT_SIZE {
            return job.error(format!("{}: File is too large", file.display()));
        }

        self.events.emit(&CopyTorrentEvent::Copying(file.to_path_buf()));
        let target = if self.destination.is_dir() {
            self.destination.join(basename(file))
        } else {
            self.destination.clone()
        };
        match fs::copy(file, &target) {
            Ok(_) => {
                job.send(target.display())?;
                self.events.emit(&CopyTorrentEvent::Copied(target));
                Ok(())
            }
            Err(e) => {
                job.error(format!(
                    "Failed to copy {} to {}: {}",
                    file.display(),
                    self.destination.display(),
                    io_message(&e)
                ))?;
                job.send(file.display())
            }
        }
    }
}

/// The OS error text without the "(os error N)" suffix.
fn io_message(e: &std::io::Error) -> String {
    let text = e.to_string();
    match text.find(" (os error") {
        Some(end) => text[..end].to_string(),
        None => text,
    }
}

impl JobKind for CopyTorrent {
    fn name(&self) -> &str {
        "copy-torrent"
    }

    fn label(&self) -> &str {
        "Copy Torrent"
    }

    fn initialize(&self, job: &Job) {
        if self.files.is_empty() {
            return;
        }
        for file in &self.files {
            if let Err(e) = self.copy(job, file) {
                tracing::warn!(error = %e, "copy failed");
            }
        }
        job.finish();
    }

    fn execute(&self, _job: &Job) {}

    fn pipe_input(&self, job: &Job, value: &str) -> Result<(), JobError> {
        self.copy(job, Path::new(value))
    }

    fn pipe_closed(&self, job: &Job) -> Result<(), JobError> {
        job.finish();
        Ok(())
    }

    fn cache_args(&self) -> Option<CacheArgs> {
        None
    }
}

#[cfg(test)]
#[path = "copy_torrent_tests.rs"]
mod tests;
