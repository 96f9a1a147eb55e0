// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::ImageHost;
use crate::content::basename;
use crate::metadata::RequestError;

#[derive(Default)]
struct FakeState {
    uploads: Vec<PathBuf>,
    failures: HashMap<PathBuf, String>,
}

/// Host that records uploads and answers `https://img.example/<file name>`
#[derive(Clone, Default)]
pub struct FakeImageHost {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeImageHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make uploading `path` fail with `message`.
    pub fn fail_on(&self, path: impl Into<PathBuf>, message: &str) {
        self.inner.lock().failures.insert(path.into(), message.to_string());
    }

    pub fn uploads(&self) -> Vec<PathBuf> {
        self.inner.lock().uploads.clone()
    }
}

#[async_trait]
impl ImageHost for FakeImageHost {
    fn name(&self) -> &str {
        "fake"
    }

    async fn upload(&self, image_path: &Path) -> Result<String, RequestError> {
        let mut state = self.inner.lock();
        state.uploads.push(image_path.to_path_buf());
        if let Some(message) = state.failures.get(image_path) {
            return Err(RequestError(message.clone()));
        }
        Ok(format!("https://img.example/{}", basename(image_path)))
    }
}
