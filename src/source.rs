//! Snapshot loading: NDJSON post records, plain or zstd-compressed.
//!
//! This is the ingestion boundary. Bad lines are counted and skipped with a warning;
//! only well-formed `Post`s with an id reach the core.

use crate::post::{parse_post, Post};
use ahash::AHashSet;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zstd::stream::read::Decoder;

const READ_BUF_BYTES: usize = 256 * 1024;

/// Outcome of loading one or more snapshot files.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub posts: Vec<Post>,
    pub rejected: u64,
    pub duplicates: u64,
}

impl LoadReport {
    /// Append a post unless its id was already taken (first occurrence wins).
    fn push(&mut self, seen: &mut AHashSet<String>, post: Post) {
        if seen.insert(post.id.clone()) {
            self.posts.push(post);
        } else {
            self.duplicates += 1;
        }
    }
}

fn is_snapshot(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    name.ends_with(".jsonl") || name.ends_with(".ndjson") || name.ends_with(".zst")
}

fn open_lines(path: &Path) -> Result<Box<dyn BufRead>> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let inner: Box<dyn Read> = if path.extension().and_then(|e| e.to_str()) == Some("zst") {
        let mut dec = Decoder::new(f).with_context(|| format!("zstd decoder for {}", path.display()))?;
        dec.window_log_max(31)?;
        Box::new(dec)
    } else {
        Box::new(f)
    };
    Ok(Box::new(BufReader::with_capacity(READ_BUF_BYTES, inner)))
}

/// Call `on_line` for every non-blank line (trailing `\r?\n` stripped).
pub fn for_each_line(path: &Path, mut on_line: impl FnMut(&str)) -> Result<()> {
    let mut reader = open_lines(path)?;
    let mut buf = String::with_capacity(16 * 1024);
    loop {
        buf.clear();
        let n = reader.read_line(&mut buf).with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        let line = buf.trim_end_matches(&['\n', '\r'][..]);
        if line.trim().is_empty() {
            continue;
        }
        on_line(line);
    }
    Ok(())
}

fn load_into(path: &Path, min_year: Option<u16>, seen: &mut AHashSet<String>, out: &mut LoadReport) -> Result<()> {
    let mut line_no = 0u64;
    for_each_line(path, |line| {
        line_no += 1;
        match parse_post(line) {
            Ok(post) => {
                let too_old = match (min_year, post.month()) {
                    (Some(y), Some(ym)) => ym.year < i32::from(y),
                    _ => false,
                };
                if !too_old {
                    out.push(seen, post);
                }
            }
            Err(e) => {
                out.rejected += 1;
                tracing::warn!(path = %path.display(), line = line_no, error = %e, "Skipping malformed post record");
            }
        }
    })
}

/// Load one snapshot file (`.jsonl`, `.ndjson`, or zstd `.zst`).
/// Posts created before `min_year` are dropped; duplicate ids keep the first record.
pub fn load_posts(path: &Path, min_year: Option<u16>) -> Result<LoadReport> {
    let mut out = LoadReport::default();
    let mut seen = AHashSet::new();
    load_into(path, min_year, &mut seen, &mut out)?;
    tracing::info!(
        path = %path.display(), loaded = out.posts.len(), rejected = out.rejected,
        duplicates = out.duplicates, "Loaded post snapshot"
    );
    Ok(out)
}

/// Snapshot files directly inside `dir`, sorted by name.
pub fn discover_snapshots(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_snapshot(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// Load and merge every snapshot in `dir`; ids already seen in an earlier file are skipped.
pub fn load_posts_dir(dir: &Path, min_year: Option<u16>) -> Result<LoadReport> {
    let files = discover_snapshots(dir);
    if files.is_empty() {
        tracing::warn!("No snapshot files found in {}", dir.display());
    }
    let mut out = LoadReport::default();
    let mut seen = AHashSet::new();
    for f in &files {
        load_into(f, min_year, &mut seen, &mut out)?;
    }
    tracing::info!(
        files = files.len(), loaded = out.posts.len(), rejected = out.rejected,
        duplicates = out.duplicates, "Loaded post snapshots"
    );
    Ok(out)
}
