// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon process owned by a job kind.

use std::sync::OnceLock;

use relprep_core::{Job, JobError};
use relprep_daemon::{DaemonError, DaemonProcess};

/// Holds the kind's [`DaemonProcess`], which can only be built once the job
/// handle exists (in `initialize`).
#[derive(Default)]
pub(crate) struct Background {
    process: OnceLock<DaemonProcess>,
}

impl Background {
    pub(crate) fn set(&self, process: DaemonProcess) {
        if self.process.set(process).is_err() {
            tracing::warn!("daemon process already set");
        }
    }

    /// Start the worker; failing to spawn it is fatal for `job`.
    pub(crate) fn start(&self, job: &Job) {
        if let Some(process) = self.process.get() {
            if let Err(e) = process.start() {
                job.abort(worker_error(job, &e));
            }
        }
    }

    pub(crate) fn stop(&self) {
        if let Some(process) = self.process.get() {
            process.stop();
        }
    }

    pub(crate) async fn join(&self, job: &Job) -> Result<(), JobError> {
        match self.process.get() {
            Some(process) => process.join().await.map_err(|e| worker_error(job, &e)),
            None => Ok(()),
        }
    }
}

fn worker_error(job: &Job, e: &DaemonError) -> JobError {
    JobError::Worker { job: job.name().to_string(), message: e.to_string() }
}
