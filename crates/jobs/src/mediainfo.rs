// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mediainfo` report for release content.

use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use relprep_adapters::media;
use relprep_core::{CacheArgs, Job, JobConfig, JobError, JobKind};
use tokio::task::JoinHandle;

struct Mediainfo {
    content_path: PathBuf,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Sends the `mediainfo` output for the first video in the content, with
/// the content's parent directory removed from paths.
pub struct MediainfoJob {
    job: Job,
}

impl MediainfoJob {
    pub fn new(config: JobConfig, content_path: impl Into<PathBuf>) -> Self {
        let kind = Mediainfo { content_path: content_path.into(), task: Mutex::new(None) };
        Self { job: Job::new(config, Arc::new(kind)) }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }
}

impl Deref for MediainfoJob {
    type Target = Job;

    fn deref(&self) -> &Job {
        &self.job
    }
}

#[async_trait]
impl JobKind for Mediainfo {
    fn name(&self) -> &str {
        "mediainfo"
    }

    fn label(&self) -> &str {
        "Mediainfo"
    }

    fn execute(&self, job: &Job) {
        let job = job.clone();
        let content_path = self.content_path.clone();
        let task = tokio::spawn(async move {
            match media::mediainfo(&content_path).await {
                Ok(report) => job.send_if_not_finished(report),
                Err(e) => job.error_if_not_finished(e),
            }
            job.finish();
        });
        *self.task.lock() = Some(task);
    }

    fn cache_args(&self) -> Option<CacheArgs> {
        Some(CacheArgs::new().arg("content_path", self.content_path.display()))
    }

    async fn joined(&self, job: &Job) -> Result<(), JobError> {
        let task = self.task.lock().take();
        match task {
            Some(task) => task
                .await
                .map_err(|e| JobError::Other { job: job.name().to_string(), message: e.to_string() }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "mediainfo_tests.rs"]
mod tests;
