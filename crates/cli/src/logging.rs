// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tracing setup for the CLI and for worker processes.
//!
//! Logs go to stderr; stdout belongs to job output (and, in worker
//! processes, to message frames).

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "warn";
const DEBUG_FILTER: &str = "debug";

/// RELPREP_LOG wins over `--debug`.
fn directives(debug: bool, env: Option<String>) -> String {
    env.unwrap_or_else(|| if debug { DEBUG_FILTER } else { DEFAULT_FILTER }.to_string())
}

/// Install the global subscriber.
///
/// With `log_file`, records are also appended there through a
/// non-blocking writer; keep the returned guard alive until exit so
/// buffered lines get flushed.
pub fn init(debug: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(directives(debug, crate::env::log_filter()))
        .context("invalid RELPREP_LOG")?;

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init()
        .context("cannot install log subscriber")?;
    Ok(guard)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
