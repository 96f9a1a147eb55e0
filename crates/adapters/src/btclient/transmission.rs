// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transmission daemon RPC.
//!
//! https://github.com/transmission/transmission/blob/main/docs/rpc-spec.md

use std::path::Path;

use async_trait::async_trait;
use base64::Engine;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::{BtClient, TorrentError};

pub const DEFAULT_URL: &str = "http://localhost:9091/transmission/rpc";
const CSRF_HEADER: &str = "X-Transmission-Session-Id";

/// Client for Transmission's JSON-RPC API
pub struct TransmissionClient {
    url: String,
    username: String,
    password: String,
    http: reqwest::Client,
    session_id: Mutex<Option<String>>,
}

impl TransmissionClient {
    pub fn new(url: Option<&str>, username: &str, password: &str) -> Self {
        Self {
            url: url.filter(|u| !u.is_empty()).unwrap_or(DEFAULT_URL).to_string(),
            username: username.to_string(),
            password: password.to_string(),
            http: reqwest::Client::new(),
            session_id: Mutex::new(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, body: &Value) -> Result<Value, TorrentError> {
        // One retry after Transmission hands out a session ID
        for _ in 0..2 {
            let mut request = self.http.post(&self.url).json(body);
            if !self.username.is_empty() || !self.password.is_empty() {
                request = request.basic_auth(&self.username, Some(&self.password));
            }
            if let Some(id) = self.session_id.lock().clone() {
                request = request.header(CSRF_HEADER, id);
            }

            let response = request.send().await.map_err(|e| {
                if e.is_connect() {
                    TorrentError(format!("{}: Failed to connect", self.url))
                } else {
                    TorrentError(format!("{}: {e}", self.url))
                }
            })?;

            match response.status() {
                StatusCode::CONFLICT => {
                    let id = response
                        .headers()
                        .get(CSRF_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    tracing::debug!(session_id = ?id, "transmission session id changed");
                    *self.session_id.lock() = id;
                    continue;
                }
                StatusCode::UNAUTHORIZED => {
                    return Err(TorrentError("Authentication failed".to_string()));
                }
                _ => {}
            }

            let text = response
                .text()
                .await
                .map_err(|e| TorrentError(format!("{}: {e}", self.url)))?;
            return serde_json::from_str(&text)
                .map_err(|_| TorrentError(format!("Malformed JSON response: {text}")));
        }
        Err(TorrentError(format!("{}: Session ID negotiation failed", self.url)))
    }
}

/// Torrent ID from a `torrent-add` response.
pub(crate) fn parse_add_response(response: &Value) -> Result<String, TorrentError> {
    let arguments = &response["arguments"];
    for key in ["torrent-added", "torrent-duplicate"] {
        match &arguments[key]["id"] {
            Value::Null => {}
            Value::String(id) => return Ok(id.clone()),
            id => return Ok(id.to_string()),
        }
    }
    match &response["result"] {
        Value::Null => Err(TorrentError("Adding failed for unknown reason".to_string())),
        Value::String(result) => Err(TorrentError(capitalize(result))),
        result => Err(TorrentError(capitalize(&result.to_string()))),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[async_trait]
impl BtClient for TransmissionClient {
    fn name(&self) -> &str {
        "transmission"
    }

    async fn add_torrent(
        &self,
        torrent_path: &Path,
        download_path: Option<&Path>,
    ) -> Result<String, TorrentError> {
        let torrent = self.read_torrent_file(torrent_path).await?;
        let mut arguments = json!({
            "metainfo": base64::engine::general_purpose::STANDARD.encode(torrent),
        });
        if let Some(dir) = download_path {
            arguments["download-dir"] = json!(dir.display().to_string());
        }
        let body = json!({ "method": "torrent-add", "arguments": arguments });
        tracing::debug!(torrent = %torrent_path.display(), url = %self.url, "adding torrent");
        let response = self.request(&body).await?;
        parse_add_response(&response)
    }
}

#[cfg(test)]
#[path = "transmission_tests.rs"]
mod tests;
