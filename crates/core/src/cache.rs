// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Disk-backed output cache.
//!
//! Successful job output is stored as a JSON array of strings in
//! `<homedir>/.output/<name>.<args>.json` and replayed on the next run
//! with identical arguments.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::JobError;

/// Name of the cache directory inside a job's homedir.
pub const CACHE_DIRNAME: &str = ".output";

/// Cache file names are kept strictly below this many bytes.
pub const MAX_FILENAME_LEN: usize = 250;

/// Hex digits of the full-key hash embedded in shortened keys.
const OVERFLOW_HASH_LEN: usize = 12;

/// Identifying arguments of a job, in construction order.
///
/// Values that name existing filesystem paths are canonicalized so that
/// relative and absolute invocations share a cache entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheArgs {
    pairs: Vec<(String, String)>,
}

impl CacheArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.pairs.push((key.into(), canonical_value(value.to_string())));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `k=v` pairs joined by `,`.
    pub fn render(&self) -> String {
        self.pairs.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(",")
    }
}

fn canonical_value(value: String) -> String {
    if value.is_empty() {
        return value;
    }
    let path = Path::new(&value);
    if path.exists() {
        if let Ok(real) = fs::canonicalize(path) {
            return real.to_string_lossy().into_owned();
        }
    }
    value
}

/// Cache directory for `homedir`, created if missing.
pub fn cache_directory(homedir: &Path) -> Result<PathBuf, JobError> {
    let path = homedir.join(CACHE_DIRNAME);
    if !path.is_dir() {
        fs::create_dir_all(&path).map_err(|e| JobError::Permission {
            path: path.clone(),
            message: format!("Unable to create directory: {e}"),
        })?;
    }
    Ok(path)
}

/// Cache file path for job `name` with `args`; creates the cache directory.
pub fn cache_file(homedir: &Path, name: &str, args: &CacheArgs) -> Result<PathBuf, JobError> {
    Ok(cache_directory(homedir)?.join(file_name(name, args)))
}

/// File name for job `name` with `args`, always shorter than [`MAX_FILENAME_LEN`].
pub fn file_name(name: &str, args: &CacheArgs) -> String {
    let filename = if args.is_empty() {
        format!("{name}.json")
    } else {
        let max_len = MAX_FILENAME_LEN.saturating_sub(name.len() + "..json".len());
        format!("{name}.{}.json", shorten(&args.render(), max_len))
    };
    filename.replace('/', "_")
}

/// Shorten `key` below `max_len` bytes, keeping prefix and suffix.
///
/// The cut-out middle is replaced with a hash of the whole key so two keys
/// that only differ in the middle still get distinct file names.
fn shorten(key: &str, max_len: usize) -> String {
    if key.len() < max_len {
        return key.to_string();
    }
    let digest = Sha256::digest(key.as_bytes());
    let hash: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    let marker = format!("…{}…", &hash[..OVERFLOW_HASH_LEN]);
    let keep = max_len.saturating_sub(marker.len() + 1) / 2;
    format!("{}{marker}{}", head(key, keep), tail(key, keep))
}

fn head(s: &str, max: usize) -> &str {
    let mut end = max.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn tail(s: &str, max: usize) -> &str {
    let mut start = s.len().saturating_sub(max);
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}

/// Read cached output; `None` if there is no cache file.
pub fn read(path: &Path) -> Result<Option<Vec<String>>, JobError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(JobError::Cache {
                path: path.to_path_buf(),
                message: format!("Unable to read cache: {e}"),
            })
        }
    };
    serde_json::from_str::<Vec<String>>(&content).map(Some).map_err(|e| JobError::Cache {
        path: path.to_path_buf(),
        message: format!("Unable to decode JSON: {:?}: {e}", content.trim_end()),
    })
}

/// Atomically replace the cache file with `output`.
pub fn write(path: &Path, output: &[String]) -> Result<(), JobError> {
    let mut json = serde_json::to_string(output).map_err(|e| JobError::Cache {
        path: path.to_path_buf(),
        message: format!("Unable to encode output as JSON: {e}"),
    })?;
    json.push('\n');

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json.as_bytes()).and_then(|_| fs::rename(&tmp_path, path)).map_err(|e| {
        JobError::Cache { path: path.to_path_buf(), message: format!("Unable to write cache: {e}") }
    })
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
