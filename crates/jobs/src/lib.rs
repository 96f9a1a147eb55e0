// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relprep-jobs: torrent, screenshot, image upload and mediainfo jobs and
//! their workers

mod background;

pub mod add_torrent;
pub mod bencode;
pub mod copy_torrent;
pub mod create_torrent;
pub mod imghost;
pub mod mediainfo;
pub mod metainfo;
pub mod screenshots;
pub mod timestamp;
pub mod workers;

#[cfg(test)]
pub(crate) mod test_support;

pub use add_torrent::{AddTorrentEvent, AddTorrentJob};
pub use copy_torrent::{CopyTorrentEvent, CopyTorrentJob};
pub use create_torrent::{CreateTorrentJob, Tracker};
pub use imghost::{ImageHostEvent, ImageHostJob};
pub use mediainfo::MediainfoJob;
pub use screenshots::{ScreenshotsEvent, ScreenshotsJob};
pub use workers::registry;
