// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! relprep - prepare release metadata and hand torrents to a client

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod color;
mod commands;
mod config;
mod driver;
mod env;
mod exit_error;
mod logging;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

use crate::commands::add_torrent::AddTorrentArgs;
use crate::commands::create_torrent::CreateTorrentArgs;
use crate::commands::mediainfo::MediainfoArgs;
use crate::commands::screenshots::ScreenshotsArgs;
use crate::commands::upload_images::UploadImagesArgs;
use crate::commands::Context;
use crate::config::Config;
use crate::driver::Driver;
use crate::exit_error::ExitError;

#[derive(Parser)]
#[command(
    name = "relprep",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_GIT_HASH"), ")"),
    about = "Prepare release metadata and hand torrents to a BitTorrent client",
    styles = color::styles(),
)]
struct Cli {
    /// Ignore cached output from previous runs
    #[arg(long, global = true)]
    ignore_cache: bool,

    /// Config file [default: $RELPREP_CONFIG or ~/.config/relprep/config.toml]
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log debug messages to stderr (RELPREP_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Also append log messages to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create torrent file and optionally add or copy it
    CreateTorrent(CreateTorrentArgs),
    /// Add torrent files to a BitTorrent client
    AddTorrent(AddTorrentArgs),
    /// Create screenshots from the first video file
    Screenshots(ScreenshotsArgs),
    /// Print mediainfo report of the first video file
    Mediainfo(MediainfoArgs),
    /// Upload images to an image host and print their URLs
    UploadImages(UploadImagesArgs),
    /// Run a background worker over stdin/stdout
    #[command(hide = true)]
    Worker {
        target: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(()) => 0,
        Err(e) => match e.downcast_ref::<ExitError>() {
            Some(exit) => {
                if !exit.message.is_empty() {
                    eprintln!("{}", exit.message);
                }
                exit.code
            }
            None => {
                eprintln!("Error: {e:#}");
                1
            }
        },
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    let _log_guard = logging::init(cli.debug, cli.log_file.as_deref())?;

    if let Command::Worker { target } = &cli.command {
        relprep_daemon::serve_stdio(&relprep_jobs::registry(), target)?;
        return Ok(());
    }

    let ctx = Context { config: Config::load(cli.config.as_deref())?, ignore_cache: cli.ignore_cache };
    let runtime = tokio::runtime::Runtime::new().context("cannot start async runtime")?;
    runtime.block_on(execute(cli.command, ctx))
}

async fn execute(command: Command, ctx: Context) -> Result<()> {
    let graph = match command {
        Command::CreateTorrent(args) => commands::create_torrent::jobs(args, &ctx)?,
        Command::AddTorrent(args) => commands::add_torrent::jobs(args, &ctx)?,
        Command::Screenshots(args) => commands::screenshots::jobs(args, &ctx)?,
        Command::Mediainfo(args) => commands::mediainfo::jobs(args, &ctx)?,
        Command::UploadImages(args) => commands::upload_images::jobs(args, &ctx)?,
        Command::Worker { .. } => return Ok(()),
    };
    match Driver::new(graph).run().await {
        Ok(0) => Ok(()),
        Ok(code) => Err(ExitError::silent(code).into()),
        Err(e) => Err(ExitError::new(1, format!("Error: {e}")).into()),
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
