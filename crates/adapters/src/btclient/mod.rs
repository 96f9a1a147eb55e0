// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! BitTorrent client adapters.

mod dummy;
mod transmission;

#[cfg(any(test, feature = "test-support"))]
mod fake;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

pub use dummy::DummyClient;
pub use transmission::{TransmissionClient, DEFAULT_URL};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{AddCall, FakeBtClient};

/// Torrent files larger than this are rejected without reading them
pub const MAX_TORRENT_SIZE: u64 = 10 * 1024 * 1024;

/// A torrent could not be read or handed to a client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TorrentError(pub String);

/// Adapter for a BitTorrent client's remote API
#[async_trait]
pub trait BtClient: Send + Sync + 'static {
    /// Client name used in messages, e.g. "transmission"
    fn name(&self) -> &str;

    /// Add the torrent at `torrent_path` and return the client's ID for it.
    async fn add_torrent(
        &self,
        torrent_path: &Path,
        download_path: Option<&Path>,
    ) -> Result<String, TorrentError>;

    /// Read a torrent file, refusing anything above [`MAX_TORRENT_SIZE`].
    async fn read_torrent_file(&self, torrent_path: &Path) -> Result<Vec<u8>, TorrentError> {
        read_torrent_file(torrent_path).await
    }
}

pub(crate) async fn read_torrent_file(path: &Path) -> Result<Vec<u8>, TorrentError> {
    let error = |e: std::io::Error| {
        TorrentError(format!("{}: {}", path.display(), crate::content::io_reason(&e)))
    };
    let metadata = tokio::fs::metadata(path).await.map_err(error)?;
    if metadata.len() > MAX_TORRENT_SIZE {
        return Err(TorrentError(format!("{}: File is too large", path.display())));
    }
    tokio::fs::read(path).await.map_err(error)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
