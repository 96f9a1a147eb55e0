// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Image hosting services.

mod dummy;
mod ptpimg;

#[cfg(any(test, feature = "test-support"))]
mod fake;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::content::io_reason;
use crate::metadata::RequestError;

pub use dummy::DummyImageHost;
pub use ptpimg::{PtpimgHost, PTPIMG_URL};

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeImageHost;

/// Longest tail of the image path that goes into a cache file name
const MAX_CACHE_KEY_LEN: usize = 200;

/// Adapter for an image hosting service
#[async_trait]
pub trait ImageHost: Send + Sync + 'static {
    /// Service name used in messages and cache file names, e.g. "ptpimg"
    fn name(&self) -> &str;

    /// Upload one image and return its URL.
    async fn upload(&self, image_path: &Path) -> Result<String, RequestError>;
}

/// Upload `image_path` unless its URL is stored in `cache_dir`.
///
/// With `force`, any stored URL is ignored and replaced. A corrupt cache file
/// counts as missing.
pub async fn upload_cached(
    host: &dyn ImageHost,
    image_path: &Path,
    cache_dir: &Path,
    force: bool,
) -> Result<String, RequestError> {
    let cache_file = cache_file(host.name(), image_path, cache_dir);
    if !force {
        if let Some(url) = read_cached_url(&cache_file).await {
            tracing::debug!(image = %image_path.display(), %url, "already uploaded");
            return Ok(url);
        }
    }

    let url = host.upload(image_path).await?;
    tracing::debug!(image = %image_path.display(), %url, host = host.name(), "uploaded image");
    let info = json!({ "url": url });
    let text = format!("{info:#}\n");
    if let Err(e) = tokio::fs::write(&cache_file, text).await {
        tracing::warn!(path = %cache_file.display(), error = %e, "unable to write upload cache");
    }
    Ok(url)
}

/// `<cache_dir>/<image>.<host>.json`
///
/// Images inside `cache_dir` are identified by file name, everything else by
/// absolute path.
pub fn cache_file(host: &str, image_path: &Path, cache_dir: &Path) -> PathBuf {
    let key = if image_path.parent() == Some(cache_dir) {
        crate::content::basename(image_path)
    } else {
        std::path::absolute(image_path).unwrap_or_else(|_| image_path.to_path_buf()).display().to_string()
    };
    let start = key
        .char_indices()
        .map(|(i, _)| i)
        .find(|i| key.len() - i <= MAX_CACHE_KEY_LEN)
        .unwrap_or(key.len());
    let key = key[start..].replace(std::path::MAIN_SEPARATOR, "_");
    cache_dir.join(format!("{key}.{host}.json"))
}

async fn read_cached_url(cache_file: &Path) -> Option<String> {
    let text = tokio::fs::read_to_string(cache_file).await.ok()?;
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(info)) => info.get("url").and_then(Value::as_str).map(str::to_string),
        _ => {
            tracing::debug!(path = %cache_file.display(), "ignoring corrupt upload cache");
            None
        }
    }
}

/// Read an image for uploading.
pub(crate) async fn read_image(image_path: &Path) -> Result<Vec<u8>, RequestError> {
    tokio::fs::read(image_path)
        .await
        .map_err(|e| RequestError(format!("{}: {}", image_path.display(), io_reason(&e))))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
