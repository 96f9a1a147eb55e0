// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use relprep_wire::ProtocolError;
use thiserror::Error;

/// Errors seen by the owner of a worker
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DaemonError {
    #[error("failed to start worker {target}: {message}")]
    Spawn { target: String, message: String },

    #[error("worker {target} crashed: {message}")]
    WorkerCrashed { target: String, message: String },

    #[error("unknown worker: {0}")]
    UnknownTarget(String),

    #[error("worker protocol error: {0}")]
    Protocol(String),
}

impl From<ProtocolError> for DaemonError {
    fn from(e: ProtocolError) -> Self {
        DaemonError::Protocol(e.to_string())
    }
}

/// Errors inside a worker function. Returning one ends the worker as crashed.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("{0}")]
    Failed(String),

    #[error("owner disconnected")]
    Disconnected,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
