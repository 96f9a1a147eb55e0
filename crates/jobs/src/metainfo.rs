// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Private BitTorrent v1 metainfo creation.
//!
//! Runs inside a worker: hashing blocks and reports progress through a
//! callback that can cancel by returning `false`.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use humansize::{format_size, BINARY};
use regex::Regex;
use relprep_adapters::{basename, io_reason, TorrentError};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use walkdir::WalkDir;

use crate::bencode::Bencode;

pub const MIN_PIECE_SIZE: u64 = 16 * 1024;
pub const MAX_PIECE_SIZE: u64 = 16 * 1024 * 1024;

const GIB: u64 = 1024 * 1024 * 1024;

/// Worker arguments for creating one torrent file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOptions {
    pub content_path: PathBuf,
    pub torrent_path: PathBuf,
    /// Replace an existing torrent file instead of reusing it
    pub overwrite: bool,
    pub announce: String,
    #[serde(default)]
    pub source: Option<String>,
    /// Regular expressions; matching files are left out
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Entry of the torrent's file tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileNode {
    File { name: String, size: u64 },
    Dir { name: String, files: Vec<FileNode> },
}

#[derive(Debug)]
struct ContentFile {
    path: PathBuf,
    /// Path below the content directory; empty for single-file torrents
    components: Vec<String>,
    size: u64,
}

#[derive(Debug)]
struct Content {
    name: String,
    files: Vec<ContentFile>,
}

impl Content {
    fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    fn is_single_file(&self) -> bool {
        matches!(self.files.as_slice(), [file] if file.components.is_empty())
    }

    fn file_tree(&self) -> Vec<FileNode> {
        if self.is_single_file() {
            return vec![FileNode::File { name: self.name.clone(), size: self.total_size() }];
        }
        let mut files = Vec::new();
        for file in &self.files {
            insert_node(&mut files, &file.components, file.size);
        }
        vec![FileNode::Dir { name: self.name.clone(), files }]
    }
}

fn insert_node(nodes: &mut Vec<FileNode>, components: &[String], size: u64) {
    match components {
        [] => {}
        [name] => nodes.push(FileNode::File { name: name.clone(), size }),
        [dir, rest @ ..] => {
            let existing = nodes
                .iter()
                .position(|node| matches!(node, FileNode::Dir { name, .. } if name == dir));
            let index = match existing {
                Some(index) => index,
                None => {
                    nodes.push(FileNode::Dir { name: dir.clone(), files: Vec::new() });
                    nodes.len() - 1
                }
            };
            if let Some(FileNode::Dir { files, .. }) = nodes.get_mut(index) {
                insert_node(files, rest, size);
            }
        }
    }
}

/// Create the torrent file described by `options`.
///
/// `on_init` gets the file tree before hashing starts. `on_progress` gets the
/// percentage of hashed pieces; returning `false` cancels, in which case
/// `Ok(None)` is returned and nothing is written.
///
/// An existing torrent file is reused unless `options.overwrite` is set.
pub fn create(
    options: &CreateOptions,
    on_init: impl FnOnce(&[FileNode]),
    mut on_progress: impl FnMut(f64) -> bool,
) -> Result<Option<PathBuf>, TorrentError> {
    if options.announce.is_empty() {
        return Err(TorrentError("Announce URL is empty".to_string()));
    }

    if !options.overwrite && options.torrent_path.exists() {
        match read_file_tree(&options.torrent_path) {
            Ok(tree) => {
                tracing::debug!(path = %options.torrent_path.display(), "torrent file already exists");
                on_init(&tree);
                return Ok(Some(options.torrent_path.clone()));
            }
            Err(e) => {
                tracing::warn!(path = %options.torrent_path.display(), error = %e, "replacing unreadable torrent file");
            }
        }
    }

    let exclude = options
        .exclude
        .iter()
        .map(|pattern| {
            Regex::new(pattern)
                .map_err(|_| TorrentError(format!("Invalid exclude pattern: {pattern}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let content = collect_content(&options.content_path, &exclude)?;
    on_init(&content.file_tree());

    let total_size = content.total_size();
    let piece_size = piece_size(total_size);
    tracing::debug!(
        content = %options.content_path.display(),
        files = content.files.len(),
        total_size,
        piece_size,
        "hashing torrent content"
    );
    let Some(pieces) = hash_pieces(&content.files, piece_size, total_size, &mut on_progress)?
    else {
        tracing::debug!(content = %options.content_path.display(), "torrent creation cancelled");
        return Ok(None);
    };

    let metainfo = build_metainfo(options, &content, piece_size, pieces);
    write_atomic(&options.torrent_path, &metainfo.encode())?;
    Ok(Some(options.torrent_path.clone()))
}

/// Piece size for `total_size` bytes of content.
///
/// Aims for 1024 to 16384 pieces depending on content size, rounded up to a
/// power of two and clamped to [`MIN_PIECE_SIZE`]..=[`MAX_PIECE_SIZE`].
pub fn piece_size(total_size: u64) -> u64 {
    let pieces = match total_size {
        s if s <= GIB => 1024,
        s if s <= 4 * GIB => 2048,
        s if s <= 8 * GIB => 4096,
        s if s <= 64 * GIB => 8192,
        _ => 16384,
    };
    let ideal = total_size.div_ceil(pieces).max(1);
    ideal.checked_next_power_of_two().unwrap_or(MAX_PIECE_SIZE).clamp(MIN_PIECE_SIZE, MAX_PIECE_SIZE)
}

fn collect_content(path: &Path, exclude: &[Regex]) -> Result<Content, TorrentError> {
    let error = |p: &Path, e: std::io::Error| TorrentError(format!("{}: {}", p.display(), io_reason(&e)));
    let name = basename(path);
    let metadata = fs::metadata(path).map_err(|e| error(path, e))?;

    if metadata.is_file() {
        if metadata.len() == 0 {
            return Err(TorrentError(format!("{}: Empty file", path.display())));
        }
        let file = ContentFile { path: path.to_path_buf(), components: Vec::new(), size: metadata.len() };
        return Ok(Content { name, files: vec![file] });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).follow_links(true).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.loop_ancestor().is_some() => {
                tracing::warn!(error = %e, "skipping symlink loop");
                continue;
            }
            Err(e) => {
                let at = e.path().unwrap_or(path).to_path_buf();
                return Err(match e.into_io_error() {
                    Some(io) => error(&at, io),
                    None => TorrentError(format!("{}: Unreadable", at.display())),
                });
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let size = entry.metadata().map_err(|e| TorrentError(format!("{}: {e}", entry.path().display())))?.len();
        if size == 0 {
            continue;
        }
        let components: Vec<String> = entry
            .path()
            .strip_prefix(path)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let relative = format!("{name}/{}", components.join("/"));
        if exclude.iter().any(|re| re.is_match(&relative)) {
            tracing::debug!(file = %relative, "excluded from torrent");
            continue;
        }
        files.push(ContentFile { path: entry.into_path(), components, size });
    }

    if files.is_empty() {
        return Err(TorrentError(format!("{}: Empty directory", path.display())));
    }
    files.sort_by(|a, b| a.components.cmp(&b.components));
    Ok(Content { name, files })
}

fn hash_pieces(
    files: &[ContentFile],
    piece_size: u64,
    total_size: u64,
    on_progress: &mut impl FnMut(f64) -> bool,
) -> Result<Option<Vec<u8>>, TorrentError> {
    let pieces_total = total_size.div_ceil(piece_size).max(1);
    let mut pieces = Vec::with_capacity(usize::try_from(pieces_total * 20).unwrap_or(0));
    let mut pieces_done = 0u64;
    let mut piece = vec![0u8; usize::try_from(piece_size).unwrap_or(usize::MAX)];
    let mut filled = 0;

    let mut piece_done = |data: &[u8], pieces: &mut Vec<u8>| {
        pieces.extend_from_slice(&Sha1::digest(data));
        pieces_done += 1;
        on_progress(pieces_done as f64 / pieces_total as f64 * 100.0)
    };

    for file in files {
        let error = |e: std::io::Error| TorrentError(format!("{}: {}", file.path.display(), io_reason(&e)));
        let mut reader = File::open(&file.path).map_err(error)?;
        loop {
            let n = reader.read(&mut piece[filled..]).map_err(error)?;
            if n == 0 {
                break;
            }
            filled += n;
            if filled == piece.len() {
                filled = 0;
                if !piece_done(&piece, &mut pieces) {
                    return Ok(None);
                }
            }
        }
    }
    if filled > 0 && !piece_done(&piece[..filled], &mut pieces) {
        return Ok(None);
    }
    Ok(Some(pieces))
}

fn build_metainfo(options: &CreateOptions, content: &Content, piece_size: u64, pieces: Vec<u8>) -> Bencode {
    let mut info = Bencode::dict();
    info.insert("name", content.name.as_str());
    info.insert("piece length", piece_size as i64);
    info.insert("pieces", Bencode::Bytes(pieces));
    info.insert("private", 1_i64);
    if let Some(source) = options.source.as_deref().filter(|s| !s.is_empty()) {
        info.insert("source", source);
    }
    if content.is_single_file() {
        info.insert("length", content.total_size() as i64);
    } else {
        let files = content
            .files
            .iter()
            .map(|file| {
                let mut entry = Bencode::dict();
                entry.insert("length", file.size as i64);
                entry.insert(
                    "path",
                    Bencode::List(file.components.iter().map(|c| Bencode::from(c.as_str())).collect()),
                );
                entry
            })
            .collect();
        info.insert("files", Bencode::List(files));
    }

    let created = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default();
    let mut metainfo = Bencode::dict();
    metainfo.insert("announce", options.announce.as_str());
    metainfo.insert("created by", format!("relprep {}", env!("CARGO_PKG_VERSION")));
    metainfo.insert("creation date", created as i64);
    metainfo.insert("info", info);
    metainfo
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), TorrentError> {
    let error = |e: std::io::Error| TorrentError(format!("{}: {}", path.display(), io_reason(&e)));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(error)?;
    }
    let tmp_path = path.with_extension("torrent.tmp");
    fs::write(&tmp_path, data).and_then(|_| fs::rename(&tmp_path, path)).map_err(error)
}

/// File tree of an existing torrent file.
pub fn read_file_tree(path: &Path) -> Result<Vec<FileNode>, TorrentError> {
    let bytes = fs::read(path).map_err(|e| TorrentError(format!("{}: {}", path.display(), io_reason(&e))))?;
    let invalid = |message: &str| TorrentError(format!("{}: {message}", path.display()));
    let metainfo = Bencode::decode(&bytes).map_err(|e| invalid(&e.to_string()))?;
    let info = metainfo.get("info").ok_or_else(|| invalid("Missing info"))?;
    let name = info.get("name").and_then(Bencode::as_str).ok_or_else(|| invalid("Missing name"))?;

    if let Some(length) = info.get("length").and_then(Bencode::as_int) {
        return Ok(vec![FileNode::File { name: name.to_string(), size: length.max(0) as u64 }]);
    }

    let entries = info.get("files").and_then(Bencode::as_list).ok_or_else(|| invalid("Missing files"))?;
    let mut files = Vec::new();
    for entry in entries {
        let size = entry.get("length").and_then(Bencode::as_int).ok_or_else(|| invalid("Missing file length"))?;
        let components = entry
            .get("path")
            .and_then(Bencode::as_list)
            .and_then(|parts| parts.iter().map(|p| p.as_str().map(str::to_string)).collect::<Option<Vec<_>>>())
            .ok_or_else(|| invalid("Missing file path"))?;
        insert_node(&mut files, &components, size.max(0) as u64);
    }
    Ok(vec![FileNode::Dir { name: name.to_string(), files }])
}

/// Render `nodes` as an indented tree with file sizes.
///
/// ```text
/// Foo
/// ├─a.mkv (1.00 GiB)
/// └─Extras
///   └─b.mkv (12.50 MiB)
/// ```
pub fn render_tree(nodes: &[FileNode]) -> String {
    let mut lines = Vec::new();
    render_nodes(nodes, &[], &mut lines);
    lines.join("\n")
}

fn render_nodes(nodes: &[FileNode], parents_last: &[bool], lines: &mut Vec<String>) {
    for (i, node) in nodes.iter().enumerate() {
        let is_last = i + 1 == nodes.len();
        let mut indent = String::new();
        if let Some((_, ancestors)) = parents_last.split_first() {
            for ancestor_last in ancestors {
                indent.push_str(if *ancestor_last { "  " } else { "│ " });
            }
            indent.push_str(if is_last { "└─" } else { "├─" });
        }
        match node {
            FileNode::File { name, size } => lines.push(format!("{indent}{name} ({})", format_size(*size, BINARY))),
            FileNode::Dir { name, files } => {
                lines.push(format!("{indent}{name}"));
                let mut parents = parents_last.to_vec();
                parents.push(is_last);
                render_nodes(files, &parents, lines);
            }
        }
    }
}

#[cfg(test)]
#[path = "metainfo_tests.rs"]
mod tests;
