// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use super::{BtClient, TorrentError};

/// Client that pretends to add every torrent. For testing and debugging.
#[derive(Debug, Clone, Default)]
pub struct DummyClient {
    delay: Duration,
}

impl DummyClient {
    pub fn new() -> Self {
        Self { delay: Duration::from_millis(500) }
    }

    /// Answer immediately instead of after half a second.
    pub fn instant() -> Self {
        Self { delay: Duration::ZERO }
    }
}

#[async_trait]
impl BtClient for DummyClient {
    fn name(&self) -> &str {
        "dummy"
    }

    async fn add_torrent(
        &self,
        torrent_path: &Path,
        _download_path: Option<&Path>,
    ) -> Result<String, TorrentError> {
        tracing::debug!(torrent = %torrent_path.display(), "pretending to add torrent");
        tokio::time::sleep(self.delay).await;
        Ok("123".to_string())
    }
}
