// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! relprep-daemon: run blocking work in a worker process or thread and
//! stream its messages back to the owning job.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod env;
mod error;
mod process;
mod registry;
mod worker;

pub use error::{DaemonError, WorkerError};
pub use process::{DaemonProcess, Spawn};
pub use registry::WorkerRegistry;
pub use worker::{serve_stdio, Inbox, Outbox, WorkerFn};
