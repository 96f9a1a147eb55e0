// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ptpimg.me uploads.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use super::{read_image, ImageHost};
use crate::content::basename;
use crate::metadata::RequestError;

pub const PTPIMG_URL: &str = "https://ptpimg.me";

/// Client for ptpimg.me's upload API
pub struct PtpimgHost {
    base_url: String,
    apikey: String,
    http: reqwest::Client,
}

impl PtpimgHost {
    pub fn new(base_url: Option<&str>, apikey: &str) -> Self {
        Self {
            base_url: base_url
                .filter(|u| !u.is_empty())
                .unwrap_or(PTPIMG_URL)
                .trim_end_matches('/')
                .to_string(),
            apikey: apikey.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Image URL from an `upload.php` response: `[{"code": ..., "ext": ...}]`.
pub(crate) fn parse_upload_response(base_url: &str, response: &Value) -> Result<String, RequestError> {
    let image = &response[0];
    match (image["code"].as_str(), image["ext"].as_str()) {
        (Some(code), Some(ext)) if !code.is_empty() && !ext.is_empty() => {
            Ok(format!("{base_url}/{code}.{ext}"))
        }
        _ => Err(RequestError(format!("Unexpected response: {response}"))),
    }
}

#[async_trait]
impl ImageHost for PtpimgHost {
    fn name(&self) -> &str {
        "ptpimg"
    }

    async fn upload(&self, image_path: &Path) -> Result<String, RequestError> {
        if self.apikey.is_empty() {
            return Err(RequestError("Missing API key".to_string()));
        }
        let image = read_image(image_path).await?;
        let form = Form::new()
            .text("api_key", self.apikey.clone())
            .part("file-upload[0]", Part::bytes(image).file_name(basename(image_path)));
        let url = format!("{}/upload.php", self.base_url);
        tracing::debug!(image = %image_path.display(), %url, "uploading image");

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::REFERER, format!("{}/index.php", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    RequestError(format!("{}: Failed to connect", self.base_url))
                } else {
                    RequestError(format!("{}: {e}", self.base_url))
                }
            })?;
        let status = response.status();
        let text = response.text().await.map_err(|e| RequestError(format!("{}: {e}", self.base_url)))?;
        if !status.is_success() {
            return Err(RequestError(format!("{url}: {status}")));
        }
        let json: Value =
            serde_json::from_str(&text).map_err(|_| RequestError(format!("Malformed JSON response: {text}")))?;
        parse_upload_response(&self.base_url, &json)
    }
}

#[cfg(test)]
#[path = "ptpimg_tests.rs"]
mod tests;
