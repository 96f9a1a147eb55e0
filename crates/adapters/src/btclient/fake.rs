// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{BtClient, TorrentError};

/// Recorded `add_torrent` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddCall {
    pub torrent_path: PathBuf,
    pub download_path: Option<PathBuf>,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<AddCall>,
    failures: HashMap<PathBuf, String>,
    next_id: u32,
}

/// Client that records calls and hands out sequential IDs
#[derive(Clone, Default)]
pub struct FakeBtClient {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeBtClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make adding `path` fail with `message`.
    pub fn fail_on(&self, path: impl Into<PathBuf>, message: &str) {
        self.inner.lock().failures.insert(path.into(), message.to_string());
    }

    pub fn calls(&self) -> Vec<AddCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl BtClient for FakeBtClient {
    fn name(&self) -> &str {
        "fake"
    }

    async fn add_torrent(
        &self,
        torrent_path: &Path,
        download_path: Option<&Path>,
    ) -> Result<String, TorrentError> {
        let mut state = self.inner.lock();
        state.calls.push(AddCall {
            torrent_path: torrent_path.to_path_buf(),
            download_path: download_path.map(Path::to_path_buf),
        });
        if let Some(message) = state.failures.get(torrent_path) {
            return Err(TorrentError(message.clone()));
        }
        state.next_id += 1;
        Ok(state.next_id.to_string())
    }
}
