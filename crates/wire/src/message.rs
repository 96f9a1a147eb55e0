// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message from a worker to the job that owns it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerMessage {
    /// Preparation is done; `data` describes the work ahead
    Init { data: Value },

    /// Progress or an intermediate result
    Info { data: Value },

    /// Recoverable error; the worker keeps going
    Error { message: String },

    /// Final result; the worker exits after sending this
    Result {
        #[serde(default)]
        data: Option<Value>,
    },

    /// Unexpected failure inside the worker
    Crashed { message: String },
}

/// Message from a job to its worker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerCommand {
    /// First message a worker receives
    Start { args: Value },

    /// Stop as soon as possible
    Terminate,

    /// Worker-specific request
    Custom { data: Value },
}

impl WorkerMessage {
    /// Whether the worker is done after sending this message.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerMessage::Result { .. } | WorkerMessage::Crashed { .. })
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
