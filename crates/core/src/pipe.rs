// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connect one job's output to another job's input.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::JobError;
use crate::job::Job;

/// Forwards every output item of `sender` to [`Job::pipe_input`] of
/// `receiver` and calls [`Job::pipe_closed`] once when `sender` finishes.
///
/// The sender's observer lists keep the pipe alive, so the returned handle
/// doesn't have to be stored.
#[derive(Clone)]
pub struct Pipe {
    inner: Arc<PipeInner>,
}

struct PipeInner {
    sender: String,
    receiver: Job,
    closed: AtomicBool,
}

impl Pipe {
    pub fn connect(sender: &Job, receiver: &Job) -> Pipe {
        tracing::debug!(sender = sender.name(), receiver = receiver.name(), "connecting pipe");
        let pipe = Pipe {
            inner: Arc::new(PipeInner {
                sender: sender.name().to_string(),
                receiver: receiver.clone(),
                closed: AtomicBool::new(false),
            }),
        };

        let forward = pipe.clone();
        sender.on_output(move |output| forward.forward(output));
        let close = pipe.clone();
        sender.on_finished(move |_| close.close());

        pipe
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    fn forward(&self, output: &str) {
        let receiver = &self.inner.receiver;
        if self.is_closed() {
            receiver.abort(JobError::PipeClosed {
                sender: self.inner.sender.clone(),
                receiver: receiver.name().to_string(),
            });
            return;
        }
        match receiver.pipe_input(output) {
            Ok(()) => {}
            Err(JobError::Finished { .. }) => {
                tracing::debug!(receiver = receiver.name(), "dropping piped output after receiver finished");
            }
            Err(e) => receiver.abort(e),
        }
    }

    fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!(sender = %self.inner.sender, receiver = self.inner.receiver.name(), "pipe closed");
        if let Err(e) = self.inner.receiver.pipe_closed() {
            self.inner.receiver.abort(e);
        }
    }
}

#[cfg(test)]
#[path = "pipe_tests.rs"]
mod tests;
