// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User configuration: trackers, BitTorrent clients and image hosts.
//!
//! ```toml
//! [trackers.nbl]
//! announce = "https://tracker.example/announce/secret"
//! source = "NBL"
//! exclude = ['\.nfo$']
//!
//! [clients.transmission]
//! url = "http://localhost:9091/transmission/rpc"
//! username = "me"
//! password = "secret"
//!
//! [imghosts.ptpimg]
//! apikey = "secret"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use relprep_adapters::{BtClient, DummyClient, DummyImageHost, ImageHost, PtpimgHost, TransmissionClient};
use relprep_jobs::Tracker;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("{}: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("Unknown tracker: {0}")]
    UnknownTracker(String),

    #[error("Unknown client: {0}")]
    UnknownClient(String),

    #[error("Unsupported client type for {name}: {client}")]
    UnsupportedClient { name: String, client: String },

    #[error("Unknown image host: {0}")]
    UnknownImageHost(String),

    #[error("Unsupported image host type for {name}: {host}")]
    UnsupportedImageHost { name: String, host: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    pub announce: String,
    pub source: Option<String>,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Client type; the section name is used when missing
    pub client: Option<String>,
    pub url: Option<String>,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageHostConfig {
    /// Image host type; the section name is used when missing
    pub host: Option<String>,
    pub base_url: Option<String>,
    pub apikey: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub trackers: BTreeMap<String, TrackerConfig>,
    pub clients: BTreeMap<String, ClientConfig>,
    pub imghosts: BTreeMap<String, ImageHostConfig>,
}

impl Config {
    /// Built-in sections, overridden by the config file
    pub fn builtin() -> Self {
        let mut config = Config::default();
        config.trackers.insert(
            "dummy".to_string(),
            TrackerConfig {
                announce: "http://localhost:12345/dummy/announce".to_string(),
                source: Some("DMY".to_string()),
                exclude: Vec::new(),
            },
        );
        config.clients.insert("dummy".to_string(), ClientConfig::default());
        config.clients.insert("transmission".to_string(), ClientConfig::default());
        config.imghosts.insert("dummy".to_string(), ImageHostConfig::default());
        config.imghosts.insert("ptpimg".to_string(), ImageHostConfig::default());
        config
    }

    /// Load `explicit` or the default config file.
    ///
    /// A missing default file yields the built-in config. A missing file
    /// that was asked for explicitly is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => match crate::env::config_path() {
                Some(path) => (path, false),
                None => return Ok(Self::builtin()),
            },
        };

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::builtin());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        tracing::debug!(path = %path.display(), "loading config");
        Self::parse(&text).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Parse TOML and merge it over the built-in sections.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let file: Config = toml::from_str(text)?;
        let mut config = Self::builtin();
        config.trackers.extend(file.trackers);
        config.clients.extend(file.clients);
        config.imghosts.extend(file.imghosts);
        Ok(config)
    }

    pub fn tracker(&self, name: &str) -> Result<Tracker, ConfigError> {
        let key = name.to_lowercase();
        let section =
            self.trackers.get(&key).ok_or_else(|| ConfigError::UnknownTracker(name.to_string()))?;
        Ok(Tracker {
            name: key,
            announce: section.announce.clone(),
            source: section.source.clone().filter(|s| !s.is_empty()),
            exclude: section.exclude.clone(),
        })
    }

    pub fn client(&self, name: &str) -> Result<Arc<dyn BtClient>, ConfigError> {
        let section =
            self.clients.get(name).ok_or_else(|| ConfigError::UnknownClient(name.to_string()))?;
        let client = section.client.as_deref().unwrap_or(name);
        match client {
            "dummy" => Ok(Arc::new(DummyClient::new())),
            "transmission" => Ok(Arc::new(TransmissionClient::new(
                section.url.as_deref(),
                &section.username,
                &section.password,
            ))),
            other => Err(ConfigError::UnsupportedClient {
                name: name.to_string(),
                client: other.to_string(),
            }),
        }
    }

    pub fn imghost(&self, name: &str) -> Result<Arc<dyn ImageHost>, ConfigError> {
        let section =
            self.imghosts.get(name).ok_or_else(|| ConfigError::UnknownImageHost(name.to_string()))?;
        match section.host.as_deref().unwrap_or(name) {
            "dummy" => Ok(Arc::new(DummyImageHost::new())),
            "ptpimg" => Ok(Arc::new(PtpimgHost::new(section.base_url.as_deref(), &section.apikey))),
            other => Err(ConfigError::UnsupportedImageHost {
                name: name.to_string(),
                host: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
