// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use super::{read_image, ImageHost};
use crate::content::basename;
use crate::metadata::RequestError;

/// Host that pretends to upload every readable image. For testing and
/// debugging.
#[derive(Debug, Clone, Default)]
pub struct DummyImageHost {
    delay: Duration,
}

impl DummyImageHost {
    pub fn new() -> Self {
        Self { delay: Duration::from_millis(500) }
    }

    /// Answer immediately instead of after half a second.
    pub fn instant() -> Self {
        Self { delay: Duration::ZERO }
    }
}

#[async_trait]
impl ImageHost for DummyImageHost {
    fn name(&self) -> &str {
        "dummy"
    }

    async fn upload(&self, image_path: &Path) -> Result<String, RequestError> {
        read_image(image_path).await?;
        tokio::time::sleep(self.delay).await;
        Ok(format!("http://localhost/{}", basename(image_path)))
    }
}
