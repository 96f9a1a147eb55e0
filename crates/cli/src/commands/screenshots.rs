// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `relprep screenshots` - Create screenshots from the first video and optionally upload them

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use relprep_jobs::{timestamp, ImageHostJob, ScreenshotsEvent, ScreenshotsJob};

use super::Context;
use crate::driver::JobGraph;

#[derive(Args, Debug)]
pub struct ScreenshotsArgs {
    /// Path to release content
    pub content: PathBuf,

    /// Positions in the video as [[HH:]MM:]SS
    #[arg(long, short, num_args = 1.., value_parser = parse_timestamp)]
    pub timestamps: Vec<String>,

    /// How many screenshots to create at least
    #[arg(long, short, default_value_t = 0)]
    pub number: usize,

    /// Upload screenshots to this image host
    #[arg(long, value_name = "HOST")]
    pub upload_to: Option<String>,
}

/// Reject malformed timestamps before any job is created.
fn parse_timestamp(text: &str) -> Result<String, String> {
    timestamp::parse(text).map(|_| text.to_string()).map_err(|e| e.to_string())
}

pub fn jobs(args: ScreenshotsArgs, ctx: &Context) -> Result<JobGraph> {
    let homedir = super::homedir(&args.content)?;
    let imghost = args.upload_to.as_deref().map(|name| ctx.config.imghost(name)).transpose()?;

    let screenshots =
        ScreenshotsJob::new(ctx.job_config(&homedir), &args.content, args.timestamps, args.number);
    screenshots.on_event(|event| tracing::debug!(?event, "screenshots"));
    let mut graph = JobGraph::new();
    graph.add(&screenshots);

    if let Some(host) = imghost {
        let upload = ImageHostJob::new(ctx.job_config(&homedir), host, Vec::new());
        upload.on_event(|event| tracing::debug!(?event, "imghost"));
        let expected = upload.clone();
        screenshots.on_event(move |event| {
            if let ScreenshotsEvent::Timestamps(timestamps) = event {
                expected.set_images_total(timestamps.len());
            }
        });
        graph.add(&upload);
        graph.pipe(&screenshots, &upload);
    }

    Ok(graph)
}

#[cfg(test)]
#[path = "screenshots_tests.rs"]
mod tests;
