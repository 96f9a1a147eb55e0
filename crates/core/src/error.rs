// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fatal job errors.
//!
//! These are the errors that end a job through [`Job::wait`](crate::Job::wait).
//! Recoverable per-item failures are plain strings in [`Job::errors`](crate::Job::errors).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("{call}() called on finished job: {job}")]
    Finished { job: String, call: &'static str },

    #[error("fatal error already recorded for job: {job}")]
    AlreadyFailed { job: String },

    #[error("{hook}() is not implemented in {job}")]
    PipeUnsupported { job: String, hook: &'static str },

    #[error("output received on closed pipe: {sender} -> {receiver}")]
    PipeClosed { sender: String, receiver: String },

    #[error("{}: {message}", path.display())]
    Permission { path: PathBuf, message: String },

    #[error("{}: {message}", path.display())]
    Cache { path: PathBuf, message: String },

    #[error("{job}: worker failed: {message}")]
    Worker { job: String, message: String },

    #[error("{job}: {message}")]
    Other { job: String, message: String },
}
