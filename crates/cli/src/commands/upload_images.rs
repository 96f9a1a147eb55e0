// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `relprep upload-images` - Upload images to an image host

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use relprep_jobs::ImageHostJob;

use super::Context;
use crate::driver::JobGraph;

#[derive(Args, Debug)]
pub struct UploadImagesArgs {
    /// Image host name from the config file
    pub host: String,

    /// Images to upload
    #[arg(required = true)]
    pub images: Vec<PathBuf>,
}

pub fn jobs(args: UploadImagesArgs, ctx: &Context) -> Result<JobGraph> {
    let host = ctx.config.imghost(&args.host)?;
    let upload = ImageHostJob::new(ctx.job_config(&super::tmpdir()?), host, args.images);
    upload.on_event(|event| tracing::debug!(?event, "imghost"));
    Ok(vec![upload.job().clone()].into())
}

#[cfg(test)]
#[path = "upload_images_tests.rs"]
mod tests;
