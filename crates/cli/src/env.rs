// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use std::path::PathBuf;

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|s| !s.is_empty())
}

/// Config file used when `--config` is not given:
/// RELPREP_CONFIG > $XDG_CONFIG_HOME/relprep/config.toml > ~/.config/relprep/config.toml
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = non_empty("RELPREP_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let config_home = non_empty("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))?;
    Some(config_home.join("relprep").join("config.toml"))
}

/// `tracing_subscriber::EnvFilter` directives from RELPREP_LOG
pub fn log_filter() -> Option<String> {
    non_empty("RELPREP_LOG")
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
