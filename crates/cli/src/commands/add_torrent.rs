// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `relprep add-torrent` - Add torrent files to a BitTorrent client

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use relprep_jobs::AddTorrentJob;

use super::Context;
use crate::driver::JobGraph;

#[derive(Args, Debug)]
pub struct AddTorrentArgs {
    /// Client name from the config file
    pub client: String,

    /// Torrent files
    #[arg(required = true)]
    pub torrents: Vec<PathBuf>,

    /// Where the client finds the torrent's files
    #[arg(long, short, value_name = "DIR")]
    pub download_path: Option<PathBuf>,
}

pub fn jobs(args: AddTorrentArgs, ctx: &Context) -> Result<JobGraph> {
    let client = ctx.config.client(&args.client)?;
    let homedir = super::tmpdir()?;
    let add = AddTorrentJob::new(ctx.job_config(&homedir), client, args.download_path, args.torrents);
    add.on_event(|event| tracing::debug!(?event, "add-torrent"));
    Ok(vec![add.job().clone()].into())
}
