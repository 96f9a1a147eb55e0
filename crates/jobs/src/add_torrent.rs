// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hand torrent files to a BitTorrent client.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use relprep_adapters::{basename, BtClient, MAX_TORRENT_SIZE};
use relprep_core::{CacheArgs, Job, JobConfig, JobError, JobKind, Observers};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// How long the queue is waited on before checking for cancellation
const QUEUE_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddTorrentEvent {
    /// About to add this torrent file
    Adding(PathBuf),
    /// The client accepted a torrent and returned this ID
    Added(String),
}

#[derive(Debug)]
struct QueuedTorrent {
    torrent_path: PathBuf,
    download_path: Option<PathBuf>,
}

struct AddTorrent {
    client: Arc<dyn BtClient>,
    download_path: Option<PathBuf>,
    torrents: Vec<PathBuf>,
    queue_tx: Mutex<Option<mpsc::UnboundedSender<QueuedTorrent>>>,
    queue_rx: Mutex<Option<mpsc::UnboundedReceiver<QueuedTorrent>>>,
    task: Mutex<Option<JoinHandle<()>>>,
    events: Arc<Observers<AddTorrentEvent>>,
}

/// Adds queued torrent files one by one and sends the client's IDs.
///
/// The queue is filled from the constructor or from a pipe and the job
/// finishes once it is closed and drained. Output is never cached.
pub struct AddTorrentJob {
    job: Job,
    kind: Arc<AddTorrent>,
}

impl AddTorrentJob {
    /// With `torrents`, the queue is closed right away; otherwise it is fed by
    /// [`Job::pipe_input`] or [`AddTorrentJob::add`] until
    /// [`Job::pipe_closed`].
    pub fn new(
        config: JobConfig,
        client: Arc<dyn BtClient>,
        download_path: Option<PathBuf>,
        torrents: Vec<PathBuf>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let kind = Arc::new(AddTorrent {
            client,
            download_path,
            torrents,
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

    pub fn on_event(&self, callback: impl Fn(&AddTorrentEvent) + Send + Sync + 'static) {
        self.kind.events.register(callback);
    }

    /// Queue `torrent_path`, optionally with its own download path.
    pub fn add(&self, torrent_path: impl Into<PathBuf>, download_path: Option<PathBuf>) -> Result<(), JobError> {
        self.kind.enqueue(&self.job, torrent_path.into(), download_path)
    }
}

impl Deref for AddTorrentJob {
    type Target = Job;

    fn deref(&self) -> &Job {
        &self.job
    }
}

impl AddTorrent {
    fn enqueue(&self, job: &Job, torrent_path: PathBuf, download_path: Option<PathBuf>) -> Result<(), JobError> {
        let queued = self.queue_tx.lock().as_ref().is_some_and(|tx| {
            tx.send(QueuedTorrent { torrent_path: torrent_path.clone(), download_path }).is_ok()
        });
        if queued {
            tracing::debug!(job = job.name(), torrent = %torrent_path.display(), "queued torrent");
            Ok(())
        } else {
            Err(JobError::Other {
                job: job.name().to_string(),
                message: format!("Queue is closed: {}", torrent_path.display()),
            })
        }
    }

    fn close_queue(&self) {
        self.queue_tx.lock().take();
    }
}

#[async_trait]
impl JobKind for AddTorrent {
    fn name(&self) -> &str {
        "add-torrent"
    }

    fn label(&self) -> &str {
        "Add Torrent"
    }

    fn initialize(&self, job: &Job) {
        if self.torrents.is_empty() {
            return;
        }
        for torrent in &self.torrents {
            if let Err(e) = self.enqueue(job, torrent.clone(), None) {
                tracing::warn!(error = %e, "failed to queue torrent");
            }
        }
        self.close_queue();
    }

    fn execute(&self, job: &Job) {
        let Some(rx) = self.queue_rx.lock().take() else {
            return;
        };
        let task = tokio::spawn(add_queued(
            job.clone(),
            Arc::clone(&self.client),
            self.download_path.clone(),
            rx,
            Arc::clone(&self.events),
        ));
        *self.task.lock() = Some(task);
    }

    fn pipe_input(&self, job: &Job, value: &str) -> Result<(), JobError> {
        self.enqueue(job, PathBuf::from(value), None)
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
}

async fn add_queued(
    job: Job,
    client: Arc<dyn BtClient>,
    default_download_path: Option<PathBuf>,
    mut rx: mpsc::UnboundedReceiver<QueuedTorrent>,
    events: Arc<Observers<AddTorrentEvent>>,
) {
    while !job.is_finished() {
        match tokio::time::timeout(QUEUE_POLL, rx.recv()).await {
            Err(_) => continue,
            Ok(None) => break,
            Ok(Some(queued)) => {
                let download_path = queued.download_path.or_else(|| default_download_path.clone());
                add_one(&job, client.as_ref(), &events, &queued.torrent_path, download_path.as_deref())
                    .await;
            }
        }
    }
    job.finish();
}

async fn add_one(
    job: &Job,
    client: &dyn BtClient,
    events: &Observers<AddTorrentEvent>,
    torrent_path: &Path,
    download_path: Option<&Path>,
) {
    tracing::debug!(job = job.name(), torrent = %torrent_path.display(), client = client.name(), "adding torrent");
    events.emit(&AddTorrentEvent::Adding(torrent_path.to_path_buf()));

    if let Ok(metadata) = tokio::fs::metadata(torrent_path).await {
        if metadata.len() > MAX_TORRENT_SIZE {
            job.error_if_not_finished(format!("{}: File is too large", torrent_path.display()));
            return;
        }
    }

    match client.add_torrent(torrent_path, download_path).await {
        Ok(id) => {
            job.send_if_not_finished(&id);
            events.emit(&AddTorrentEvent::Added(id));
        }
        Err(e) => job.error_if_not_finished(format!(
            "Failed to add {} to {}: {e}",
            basename(torrent_path),
            client.name()
        )),
    }
}

#[cfg(test)]
#[path = "add_torrent_tests.rs"]
mod tests;
