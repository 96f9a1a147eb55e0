// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `relprep mediainfo` - Print mediainfo report of the first video

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use relprep_jobs::MediainfoJob;

use super::Context;
use crate::driver::JobGraph;

#[derive(Args, Debug)]
pub struct MediainfoArgs {
    /// Path to release content
    pub content: PathBuf,
}

pub fn jobs(args: MediainfoArgs, ctx: &Context) -> Result<JobGraph> {
    let homedir = super::homedir(&args.content)?;
    let mediainfo = MediainfoJob::new(ctx.job_config(&homedir), &args.content);
    Ok(vec![mediainfo.job().clone()].into())
}
