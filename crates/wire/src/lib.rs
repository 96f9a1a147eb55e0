// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messages between a job and its worker process.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod message;
mod wire;

pub use message::{WorkerCommand, WorkerMessage};
pub use wire::{decode, encode, read_frame, read_message, write_frame, write_message, ProtocolError};
pub use wire::{read_frame_sync, write_frame_sync, MAX_MESSAGE_SIZE};
