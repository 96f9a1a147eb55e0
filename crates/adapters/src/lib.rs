// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapters for external collaborators: BitTorrent clients, image hosts,
//! media tools, content discovery and metadata sources.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod btclient;
pub mod content;
pub mod env;
pub mod imghost;
pub mod media;
pub mod metadata;

pub use btclient::{BtClient, DummyClient, TorrentError, TransmissionClient, MAX_TORRENT_SIZE};
pub use content::{basename, first_video, io_reason, natural_cmp, ContentError};
pub use imghost::{DummyImageHost, ImageHost, PtpimgHost};
pub use media::{MediainfoError, ScreenshotError};
pub use metadata::{MetadataSource, RequestError};

#[cfg(any(test, feature = "test-support"))]
pub use btclient::{AddCall, FakeBtClient};

#[cfg(any(test, feature = "test-support"))]
pub use imghost::FakeImageHost;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

#[cfg(test)]
mod test_http;
