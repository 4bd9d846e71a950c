//! Diary entry extraction.
//!
//! Turns diary source text into an ordered list of [`DiaryEntry`] records.
//! Two source layouts are supported and picked from the filesystem:
//!
//! - **Single document** (a file): entries are split on header lines, see
//!   [`headers`] for the recognized shapes.
//! - **File per entry** (a directory): each `*.md` file is one entry with an
//!   optional [`frontmatter`] block; `entry_num` comes from the file stem.
//!
//! In both layouts entry bodies are trimmed, a trailing `---` separator line
//! is dropped, and entries left empty are discarded.

pub mod frontmatter;
pub mod headers;

use crate::error::DiaryError;
use crate::models::DiaryEntry;
use crate::timestamp::normalize_timestamp;
use crate::utils::truncate_for_log;
use frontmatter::split_frontmatter;
use headers::{HeaderShape, default_shapes, find_headers};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Extracts entries using a configurable, ordered set of header shapes.
pub struct Extractor {
    shapes: Vec<Box<dyn HeaderShape>>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(default_shapes())
    }
}

impl Extractor {
    /// `shapes` are tried in order; the first match on a line wins.
    pub fn new(shapes: Vec<Box<dyn HeaderShape>>) -> Self {
        Self { shapes }
    }

    /// Read `source` and extract its entries.
    ///
    /// A directory is read in file-per-entry mode, anything else as a single
    /// document.
    ///
    /// # Errors
    ///
    /// [`DiaryError::SourceMissing`] when `source` does not exist, and
    /// [`DiaryError::Io`] for other read failures.
    #[instrument(level = "info", skip_all, fields(source = %source.display()))]
    pub async fn extract(&self, source: &Path) -> Result<Vec<DiaryEntry>, DiaryError> {
        let meta = fs::metadata(source)
            .await
            .map_err(|e| DiaryError::from_source_io(source, e))?;

        let entries = if meta.is_dir() {
            extract_directory(source).await?
        } else {
            let text = fs::read_to_string(source)
                .await
                .map_err(|e| DiaryError::from_source_io(source, e))?;
            self.extract_document(&text)
        };

        info!(count = entries.len(), "Extracted diary entries");
        Ok(entries)
    }

    /// Split a single document into entries on its header lines.
    ///
    /// Text before the first header is ignored. A document without headers
    /// yields no entries.
    pub fn extract_document(&self, text: &str) -> Vec<DiaryEntry> {
        let hits = find_headers(text, &self.shapes);
        if hits.is_empty() {
            warn!("No entry headers found in source");
            return Vec::new();
        }

        let mut entries = Vec::with_capacity(hits.len());
        for (i, hit) in hits.iter().enumerate() {
            let span_end = hits.get(i + 1).map_or(text.len(), |next| next.start);
            let content = clean_content(&text[hit.end..span_end]);
            let timestamp = normalize_timestamp(hit.raw_timestamp);

            if content.is_empty() {
                debug!(%timestamp, shape = %hit.shape, "Dropping entry with empty body");
                continue;
            }
            debug!(%timestamp, shape = %hit.shape, "Parsed entry");
            entries.push(DiaryEntry::new(timestamp, content));
        }
        entries
    }
}

/// Trim `raw` and drop a trailing separator line (`---`, `-----`, ...).
pub fn clean_content(raw: &str) -> String {
    let trimmed = raw.trim();
    let (rest, last_line) = match trimmed.rfind('\n') {
        Some(idx) => (&trimmed[..idx], &trimmed[idx + 1..]),
        None => ("", trimmed),
    };

    if is_separator(last_line) {
        rest.trim().to_string()
    } else {
        trimmed.to_string()
    }
}

fn is_separator(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

/// Parse the numeric stem of `path` (`0042.md` -> `42`).
fn entry_num_from_path(path: &Path) -> Option<u64> {
    path.file_stem()?.to_str()?.parse().ok()
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// Build one entry from a per-entry file's text.
pub fn entry_from_file_text(text: &str, entry_num: Option<u64>) -> Option<DiaryEntry> {
    let (frontmatter, body) = split_frontmatter(text);

    let timestamp = match &frontmatter {
        Some(fm) => {
            debug!(keys = fm.len(), ?entry_num, "Parsed frontmatter");
            fm.get("timestamp").map(normalize_timestamp).unwrap_or_default()
        }
        None => {
            if body.trim_start().starts_with("---") {
                warn!(
                    ?entry_num,
                    preview = %truncate_for_log(text, 60),
                    "Unclosed frontmatter block; treating whole file as content"
                );
            }
            String::new()
        }
    };

    let content = clean_content(body);
    if content.is_empty() {
        debug!(?entry_num, "Dropping file entry with empty body");
        return None;
    }
    Some(DiaryEntry::new(timestamp, content).with_entry_num(entry_num))
}

/// Read every `*.md` file in `dir`, in ascending file-name order.
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
async fn extract_directory(dir: &Path) -> Result<Vec<DiaryEntry>, DiaryError> {
    let mut read_dir = fs::read_dir(dir)
        .await
        .map_err(|e| DiaryError::from_source_io(dir, e))?;

    let mut paths: Vec<PathBuf> = Vec::new();
    while let Some(dirent) = read_dir
        .next_entry()
        .await
        .map_err(|e| DiaryError::Io(dir.to_path_buf(), e))?
    {
        let path = dirent.path();
        let is_file = dirent
            .file_type()
            .await
            .map_err(|e| DiaryError::Io(path.clone(), e))?
            .is_file();
        if is_file && is_markdown(&path) {
            paths.push(path);
        } else {
            debug!(path = %path.display(), "Skipping non-entry path");
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut entries = Vec::with_capacity(paths.len());
    for path in paths {
        let text = fs::read_to_string(&path)
            .await
            .map_err(|e| DiaryError::Io(path.clone(), e))?;

        let entry_num = entry_num_from_path(&path);
        if entry_num.is_none() {
            warn!(path = %path.display(), "File name is not numeric; entry_num omitted");
        }
        if let Some(entry) = entry_from_file_text(&text, entry_num) {
            entries.push(entry);
        }
    }
    Ok(entries)
}
