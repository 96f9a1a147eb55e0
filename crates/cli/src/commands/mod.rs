// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subcommands and the job graphs they build

pub mod add_torrent;
pub mod create_torrent;
pub mod mediainfo;
pub mod screenshots;
pub mod upload_images;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use relprep_adapters::basename;
use relprep_core::JobConfig;

use crate::config::Config;

/// Shared by all subcommands that build jobs.
pub struct Context {
    pub config: Config,
    pub ignore_cache: bool,
}

impl Context {
    pub fn job_config(&self, homedir: &Path) -> JobConfig {
        JobConfig::new(homedir).ignore_cache(self.ignore_cache)
    }
}

/// `<basename(content)>.relprep` below `base`, created if missing.
pub fn project_dir(base: &Path, content: &Path) -> Result<PathBuf> {
    let name = basename(content);
    if name.is_empty() {
        bail!("{}: Invalid content path", content.display());
    }
    let dir = base.join(format!("{name}.relprep"));
    ensure_dir(&dir)?;
    tracing::debug!(path = %dir.display(), "using project directory");
    Ok(dir)
}

/// Project directory of `content` in the current working directory.
pub fn homedir(content: &Path) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    project_dir(&cwd, content)
}

/// `<tmp>/relprep` for jobs without content.
pub fn tmpdir() -> Result<PathBuf> {
    let dir = std::env::temp_dir().join("relprep");
    ensure_dir(&dir)?;
    Ok(dir)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    if !dir.is_dir() {
        bail!("Not a directory: {}", dir.display());
    }
    Ok(())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
