// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upload images to an image hosting service.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use relprep_adapters::imghost::upload_cached;
use relprep_adapters::{basename, ImageHost};
use relprep_core::{CacheArgs, Job, JobConfig, JobError, JobKind, JobStatus, Observers};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const QUEUE_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageHostEvent {
    Uploading(PathBuf),
    /// URL of an uploaded image
    Uploaded(String),
}

struct ImageHostKind {
    host: Arc<dyn ImageHost>,
    images: Vec<PathBuf>,
    total: Mutex<Option<usize>>,
    received: AtomicUsize,
    queue_tx: Mutex<Option<mpsc::UnboundedSender<PathBuf>>>,
    queue_rx: Mutex<Option<mpsc::UnboundedReceiver<PathBuf>>>,
    task: Mutex<Option<JoinHandle<()>>>,
    events: Arc<Observers<ImageHostEvent>>,
}

/// Uploads queued images one by one and sends their URLs.
///
/// Images come from the constructor or from a pipe (usually a
/// [`crate::ScreenshotsJob`]). URLs are remembered per image in the homedir
/// and reused unless the job ignores the cache; the job output itself is
/// never cached.
///
/// Succeeds iff every expected image was uploaded. The expected number is
/// set with [`ImageHostJob::set_images_total`] or, if it never is, the
/// number of images received.
#[derive(Clone)]
pub struct ImageHostJob {
    job: Job,
    kind: Arc<ImageHostKind>,
}

impl ImageHostJob {
    /// With `images`, the queue is closed right away; otherwise it is fed by
    /// [`Job::pipe_input`] until [`Job::pipe_closed`].
    pub fn new(config: JobConfig, host: Arc<dyn ImageHost>, images: Vec<PathBuf>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let kind = Arc::new(ImageHostKind {
            host,
            images,
            total: Mutex::new(None),
            received: AtomicUsize::new(0),
            queue_tx: Mutex::new(Some(tx)),
            queue_rx: Mutex::new(Some(rx)),
            task: Mutex::new(None),
            events: Arc::new(Observers::new()),
        });
        Self { job: Job::new(config, Arc::clone(&kind)), kind }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn on_event(&self, callback: impl Fn(&ImageHostEvent) + Send + Sync + 'static) {
        self.kind.events.register(callback);
    }

    /// How many images are going to be uploaded.
    pub fn set_images_total(&self, total: usize) {
        *self.kind.total.lock() = Some(total);
    }

    /// `None` until known.
    pub fn images_total(&self) -> Option<usize> {
        *self.kind.total.lock()
    }

    pub fn images_uploaded(&self) -> usize {
        self.job.output().len()
    }
}

impl Deref for ImageHostJob {
    type Target = Job;

    fn deref(&self) -> &Job {
        &self.job
    }
}

impl ImageHostKind {
    fn enqueue(&self, job: &Job, image: PathBuf) -> Result<(), JobError> {
        let queued = self.queue_tx.lock().as_ref().is_some_and(|tx| tx.send(image.clone()).is_ok());
        if queued {
            self.received.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(job = job.name(), image = %image.display(), "queued image");
            Ok(())
        } else {
            Err(JobError::Other {
                job: job.name().to_string(),
                message: format!("Queue is closed: {}", image.display()),
            })
        }
    }

    fn close_queue(&self) {
        self.queue_tx.lock().take();
    }
}

#[async_trait]
impl JobKind for ImageHostKind {
    fn name(&self) -> &str {
        "imghost"
    }

    fn label(&self) -> &str {
        "Image URLs"
    }

    fn initialize(&self, job: &Job) {
        if self.images.is_empty() {
            return;
        }
        *self.total.lock() = Some(self.images.len());
        for image in &self.images {
            if let Err(e) = self.enqueue(job, image.clone()) {
                tracing::warn!(error = %e, "failed to queue image");
            }
        }
        self.close_queue();
    }

    fn execute(&self, job: &Job) {
        let Some(rx) = self.queue_rx.lock().take() else {
            return;
        };
        let task = tokio::spawn(upload_queued(job.clone(), Arc::clone(&self.host), rx, Arc::clone(&self.events)));
        *self.task.lock() = Some(task);
    }

    fn pipe_input(&self, job: &Job, value: &str) -> Result<(), JobError> {
        self.enqueue(job, PathBuf::from(value))
    }

    fn pipe_closed(&self, _job: &Job) -> Result<(), JobError> {
        self.close_queue();
        Ok(())
    }

    fn cache_args(&self) -> Option<CacheArgs> {
        None
    }

    fn finishing(&self, _job: &Job) {
        self.close_queue();
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

    fn exit_code(&self, status: &JobStatus<'_>) -> i32 {
        let total = (*self.total.lock()).unwrap_or_else(|| self.received.load(Ordering::SeqCst));
        let uploaded = status.output.len();
        if uploaded > 0 && uploaded == total && !status.failed {
            0
        } else {
            1
        }
    }
}

async fn upload_queued(
    job: Job,
    host: Arc<dyn ImageHost>,
    mut rx: mpsc::UnboundedReceiver<PathBuf>,
    events: Arc<Observers<ImageHostEvent>>,
) {
    while !job.is_finished() {
        match tokio::time::timeout(QUEUE_POLL, rx.recv()).await {
            Err(_) => continue,
            Ok(None) => break,
            Ok(Some(image)) => upload_one(&job, host.as_ref(), &events, &image).await,
        }
    }
    job.finish();
}

async fn upload_one(job: &Job, host: &dyn ImageHost, events: &Observers<ImageHostEvent>, image: &Path) {
    events.emit(&ImageHostEvent::Uploading(image.to_path_buf()));
    match upload_cached(host, image, job.homedir(), job.ignore_cache()).await {
        Ok(url) => {
            job.send_if_not_finished(&url);
            events.emit(&ImageHostEvent::Uploaded(url));
        }
        Err(e) => job.error_if_not_finished(format!("Failed to upload {} to {}: {e}", basename(image), host.name())),
    }
}

#[cfg(test)]
#[path = "imghost_tests.rs"]
mod tests;
