// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relprep-core: job state machine, output cache and pipes

pub mod macros;

pub mod cache;
pub mod error;
pub mod job;
pub mod observer;
pub mod pipe;

#[cfg(test)]
pub(crate) mod test_support;

pub use cache::CacheArgs;
pub use error::JobError;
pub use job::{Job, JobConfig, JobKind, JobState, JobStatus, WeakJob};
pub use observer::Observers;
pub use pipe::Pipe;
