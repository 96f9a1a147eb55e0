// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

use crate::DaemonError;

/// Program started for `Spawn::Process` workers:
/// RELPREP_WORKER_EXE > the running executable
pub fn worker_exe() -> Result<PathBuf, DaemonError> {
    if let Some(exe) = std::env::var_os("RELPREP_WORKER_EXE").filter(|s| !s.is_empty()) {
        return Ok(PathBuf::from(exe));
    }
    std::env::current_exe().map_err(|e| DaemonError::Spawn {
        target: String::new(),
        message: format!("cannot locate executable: {e}"),
    })
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
