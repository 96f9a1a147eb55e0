// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `relprep create-torrent` - Create a torrent and optionally add or copy it

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Args;
use relprep_jobs::{AddTorrentJob, CopyTorrentJob, CreateTorrentJob};

use super::Context;
use crate::driver::JobGraph;

#[derive(Args, Debug)]
pub struct CreateTorrentArgs {
    /// Path to release content
    pub content: PathBuf,

    /// Tracker name from the config file
    #[arg(long, short)]
    pub tracker: String,

    /// Add the torrent to this BitTorrent client
    #[arg(long, value_name = "CLIENT")]
    pub add_to: Option<String>,

    /// Copy the torrent into this directory
    #[arg(long, value_name = "DIR")]
    pub copy_to: Option<PathBuf>,
}

pub fn jobs(args: CreateTorrentArgs, ctx: &Context) -> Result<JobGraph> {
    let homedir = super::homedir(&args.content)?;
    let tracker = ctx.config.tracker(&args.tracker)?;
    // Resolve the client first so a typo fails before anything is hashed
    let client = args.add_to.as_deref().map(|name| ctx.config.client(name)).transpose()?;

    let create = CreateTorrentJob::new(ctx.job_config(&homedir), &args.content, tracker);
    create.on_progress(|percent| tracing::debug!(percent, "hashing pieces"));
    let mut graph = JobGraph::new();
    graph.add(&create);

    if let Some(client) = client {
        let add = AddTorrentJob::new(
            ctx.job_config(&homedir),
            client,
            Some(download_path(&args.content)?),
            Vec::new(),
        );
        add.on_event(|event| tracing::debug!(?event, "add-torrent"));
        graph.add(&add);
        graph.pipe(&create, &add);
    }

    if let Some(destination) = args.copy_to {
        let copy = CopyTorrentJob::new(ctx.job_config(&homedir), destination, Vec::new());
        copy.on_event(|event| tracing::debug!(?event, "copy-torrent"));
        graph.add(&copy);
        graph.pipe(&create, &copy);
    }

    Ok(graph)
}

/// Directory that contains `content`, where the client expects its files.
fn download_path(content: &Path) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let absolute = cwd.join(content);
    Ok(absolute.parent().map(Path::to_path_buf).unwrap_or(absolute))
}

#[cfg(test)]
#[path = "create_torrent_tests.rs"]
mod tests;
