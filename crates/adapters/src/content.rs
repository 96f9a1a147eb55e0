// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Locating video files in release content.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use walkdir::WalkDir;

/// File extensions recognized as video files (compared case-insensitively)
pub const VIDEO_EXTENSIONS: &[&str] = &["mkv", "mp4", "ts", "avi", "vob"];

/// Videos shorter than this fraction of the average duration are ignored
const MIN_DURATION_RATIO: f64 = 0.5;

/// Problem with the user-provided content
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ContentError(pub String);

impl ContentError {
    pub fn new(path: &Path, message: &str) -> Self {
        ContentError(format!("{}: {message}", path.display()))
    }
}

/// Last path segment, ignoring trailing separators.
pub fn basename(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| {
        path.to_string_lossy().trim_end_matches(std::path::MAIN_SEPARATOR).to_string()
    })
}

/// Fail unless `path` is a readable regular file.
pub fn assert_file_readable(path: &Path) -> Result<(), ContentError> {
    if path.is_dir() {
        return Err(ContentError::new(path, "Is a directory"));
    }
    match std::fs::File::open(path) {
        Ok(_) => Ok(()),
        Err(e) => Err(ContentError::new(path, &io_reason(&e))),
    }
}

/// Short description of an I/O error for user-facing messages.
pub fn io_reason(e: &std::io::Error) -> String {
    match e.kind() {
        std::io::ErrorKind::NotFound => "No such file or directory".to_string(),
        std::io::ErrorKind::PermissionDenied => "Permission denied".to_string(),
        _ => e.to_string(),
    }
}

/// Compare strings so that embedded numbers sort by value ("2" < "10").
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut xs = chunks(a);
    let mut ys = chunks(b);
    loop {
        match (xs.next(), ys.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let order = match (is_number(x), is_number(y)) {
                    (true, true) => cmp_numbers(x, y),
                    _ => x.cmp(y),
                };
                if order != Ordering::Equal {
                    return order;
                }
            }
        }
    }
}

fn is_number(chunk: &str) -> bool {
    chunk.as_bytes().first().is_some_and(u8::is_ascii_digit)
}

fn cmp_numbers(x: &str, y: &str) -> Ordering {
    let x = x.trim_start_matches('0');
    let y = y.trim_start_matches('0');
    x.len().cmp(&y.len()).then_with(|| x.cmp(y))
}

/// Split into alternating runs of ASCII digits and everything else.
fn chunks(s: &str) -> impl Iterator<Item = &str> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map_or(rest.len(), |(i, _)| i);
        let (chunk, tail) = rest.split_at(end);
        rest = tail;
        Some(chunk)
    })
}

/// Files below `path` with one of `extensions`, naturally sorted by path.
///
/// A file path is returned as is if it has a matching extension.
pub fn file_list(path: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let matches = |p: &Path| {
        p.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
    };
    let mut files = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).follow_links(true) {
            match entry {
                Ok(entry) if entry.file_type().is_file() && matches(entry.path()) => {
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(error = %e, "skipping unreadable entry"),
            }
        }
    } else if matches(path) {
        files.push(path.to_path_buf());
    }
    files.sort_by(|a, b| natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));
    files
}

// S01E01, S2E001, ... as a dot or space separated word
#[allow(clippy::expect_used)]
static FIRST_EPISODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[ .])S\d+E0*1[ .]").expect("constant regex pattern is valid")
});

/// Find the first video in `path` (e.g. the first episode of a season).
///
/// Blu-ray images (directories with a `BDMV` directory) are returned as is.
/// DVD images yield their `.VOB` files. Otherwise directories are walked
/// recursively in natural order; a file named like `S01E01` wins right away,
/// else samples are dropped by duration (see
/// [`filter_similar_duration`]) and the first remaining video is returned.
pub fn first_video(path: &Path) -> Result<PathBuf, ContentError> {
    first_video_with(path, |p| crate::media::duration(p).unwrap_or(0.0))
}

/// [`first_video`] with a custom duration probe.
pub fn first_video_with(
    path: &Path,
    duration: impl Fn(&Path) -> f64,
) -> Result<PathBuf, ContentError> {
    if !path.exists() {
        return Err(ContentError::new(path, "No such file or directory"));
    }
    if path.join("BDMV").is_dir() {
        return Ok(path.to_path_buf());
    }
    let files = if path.join("VIDEO_TS").is_dir() {
        file_list(path, &["vob"])
    } else {
        file_list(path, VIDEO_EXTENSIONS)
    };

    for file in &files {
        if FIRST_EPISODE.is_match(&basename(file)) {
            tracing::debug!(file = %file.display(), "found first episode");
            return Ok(file.clone());
        }
    }

    filter_similar_duration(files, duration)
        .into_iter()
        .next()
        .ok_or_else(|| ContentError::new(path, "No video file found"))
}

/// Drop videos shorter than half the average duration.
pub fn filter_similar_duration(files: Vec<PathBuf>, duration: impl Fn(&Path) -> f64) -> Vec<PathBuf> {
    if files.len() < 2 {
        return files;
    }
    let durations: Vec<f64> = files.iter().map(|f| duration(f)).collect();
    let average = durations.iter().sum::<f64>() / durations.len() as f64;
    let min = average * MIN_DURATION_RATIO;
    files.into_iter().zip(durations).filter(|(_, d)| *d >= min).map(|(f, _)| f).collect()
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod tests;
