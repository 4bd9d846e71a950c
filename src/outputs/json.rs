//! The JSON document shared by the two pipelines.
//!
//! `export` writes it, `feed` reads it. The file is always replaced in
//! full; nothing is appended or patched.
//!
//! ```json
//! {"entries":[{"timestamp":"2026-02-14 21:36 UTC","content":"...","entry_num":12}]}
//! ```

use crate::error::DiaryError;
use crate::models::{DiaryDocument, DiaryEntry};
use crate::utils::ensure_parent_dir;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `entries` compactly, in the order given.
pub fn entries_to_json(entries: &[DiaryEntry]) -> Result<String, serde_json::Error> {
    #[derive(serde::Serialize)]
    struct Borrowed<'a> {
        entries: &'a [DiaryEntry],
    }
    serde_json::to_string(&Borrowed { entries })
}

/// Overwrite `path` with the JSON document for `entries`.
///
/// # Arguments
///
/// * `entries` - Entries in the order they should appear in the document
/// * `path` - Output file; the parent directory is created if needed
///
/// # Returns
///
/// `Ok(())` on success. [`DiaryError::Json`] if serialization fails,
/// [`DiaryError::Io`] if directory creation or the write fails.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = entries.len()))]
pub async fn write_entries(entries: &[DiaryEntry], path: &Path) -> Result<(), DiaryError> {
    let json = entries_to_json(entries).map_err(|e| DiaryError::Json(path.to_path_buf(), e))?;

    ensure_parent_dir(path)
        .await
        .map_err(|e| DiaryError::Io(path.to_path_buf(), e))?;

    if let Err(e) = fs::write(path, json).await {
        error!(error = %e, "Failed writing JSON");
        return Err(DiaryError::Io(path.to_path_buf(), e));
    }
    info!("Wrote diary JSON");
    Ok(())
}

/// Read a JSON document written by [`write_entries`] (or a bare entry array).
///
/// # Errors
///
/// [`DiaryError::SourceMissing`] if `path` does not exist,
/// [`DiaryError::Json`] if it is not a valid document.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_document(path: &Path) -> Result<DiaryDocument, DiaryError> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|e| DiaryError::from_source_io(path, e))?;
    let document: DiaryDocument =
        serde_json::from_str(&text).map_err(|e| DiaryError::Json(path.to_path_buf(), e))?;
    info!(count = document.entries.len(), "Loaded diary JSON");
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Vec<DiaryEntry> {
        vec![
            DiaryEntry::new("2026-02-14 10:00 UTC", "First \"quoted\"\nline"),
            DiaryEntry::new("", "Second").with_entry_num(Some(2)),
        ]
    }

    #[test]
    fn test_entries_to_json_is_compact() {
        let json = entries_to_json(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"entries":[{"timestamp":"2026-02-14 10:00 UTC","content":"First \"quoted\"\nline"},{"timestamp":"","content":"Second","entry_num":2}]}"#
        );
    }

    #[test]
    fn test_empty_entry_list() {
        assert_eq!(entries_to_json(&[]).unwrap(), r#"{"entries":[]}"#);
    }

    #[tokio::test]
    async fn test_write_is_deterministic_and_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/diary_entries.json");

        std::fs::create_dir_all(dir.path().join("out")).unwrap();
        std::fs::write(&path, "stale content that is much longer than the new document").unwrap();

        write_entries(&sample(), &path).await.unwrap();
        let first = std::fs::read(&path).unwrap();
        write_entries(&sample(), &path).await.unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, entries_to_json(&sample()).unwrap().into_bytes());
    }

    #[tokio::test]
    async fn test_read_back_written_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("diary_entries.json");
        write_entries(&sample(), &path).await.unwrap();

        let doc = read_document(&path).await.unwrap();
        assert_eq!(doc.entries, sample());
    }

    #[tokio::test]
    async fn test_read_missing_and_invalid() {
        let dir = tempdir().unwrap();
        let missing = read_document(&dir.path().join("nope.json")).await.unwrap_err();
        assert!(matches!(missing, DiaryError::SourceMissing(_)));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        let invalid = read_document(&bad).await.unwrap_err();
        assert!(matches!(invalid, DiaryError::Json(_, _)));
    }
}
