//! Utility functions for string truncation and output paths.
//!
//! - Word-boundary truncation for feed descriptions
//! - Short previews of source text for log lines
//! - Output directory preparation before a full overwrite

use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

/// Marker appended to truncated feed descriptions.
pub const ELLIPSIS: &str = "...";

/// Truncate `text` to at most `max_chars` characters without splitting a word.
///
/// Text that already fits is returned unchanged. Otherwise the cut falls on
/// the last whitespace at or before the limit and [`ELLIPSIS`] is appended,
/// so the result is never longer than `max_chars + ELLIPSIS.len()`.
///
/// A single word longer than the limit has no boundary to cut at and is cut
/// at exactly `max_chars`.
///
/// # Arguments
///
/// * `text` - The text to shorten, usually an entry body
/// * `max_chars` - Limit counted in characters, not bytes
///
/// # Returns
///
/// A new string: `text` itself when it fits, otherwise the kept words
/// followed by [`ELLIPSIS`].
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_words("hello brave new world", 12), "hello brave...");
/// assert_eq!(truncate_words("short", 12), "short");
/// ```
pub fn truncate_words(text: &str, max_chars: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };

    let head = &text[..cut];
    let next_is_boundary = text[cut..].starts_with(char::is_whitespace);

    let kept = if next_is_boundary {
        head.trim_end()
    } else {
        match head.rfind(char::is_whitespace) {
            Some(idx) => head[..idx].trim_end(),
            None => head,
        }
    };

    format!("{kept}{ELLIPSIS}")
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and the number
/// of omitted bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Ensure the directory that will hold `path` exists.
///
/// # Errors
///
/// Returns the I/O error if the directory cannot be created.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).await?;
            debug!(dir = %parent.display(), "Output directory ready");
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_truncate_words_fits() {
        assert_eq!(truncate_words("Hello world", 500), "Hello world");
        assert_eq!(truncate_words("exactly", 7), "exactly");
        assert_eq!(truncate_words("", 5), "");
    }

    #[test]
    fn test_truncate_words_cuts_at_whitespace() {
        assert_eq!(truncate_words("hello brave new world", 12), "hello brave...");
        assert_eq!(truncate_words("hello brave new world", 13), "hello brave...");
    }

    #[test]
    fn test_truncate_words_limit_on_boundary() {
        assert_eq!(truncate_words("hello brave new world", 11), "hello brave...");
        assert_eq!(truncate_words("hello\nbrave new", 5), "hello...");
    }

    #[test]
    fn test_truncate_words_single_long_word() {
        assert_eq!(truncate_words("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn test_truncate_words_never_splits_words() {
        let text = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod";
        let words: Vec<&str> = text.split_whitespace().collect();
        for limit in 5..text.len() {
            let out = truncate_words(text, limit);
            assert!(out.chars().count() <= limit + ELLIPSIS.len(), "limit {limit}: {out}");
            let body = out.strip_suffix(ELLIPSIS).unwrap();
            for word in body.split_whitespace() {
                assert!(words.contains(&word), "limit {limit} split a word: {out}");
            }
        }
    }

    #[test]
    fn test_truncate_words_multibyte() {
        assert_eq!(truncate_words("héllo wörld ünïcode", 13), "héllo wörld...");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[tokio::test]
    async fn test_ensure_parent_dir_creates_nested() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("site/data/diary_entries.json");
        ensure_parent_dir(&target).await.unwrap();
        assert!(dir.path().join("site/data").is_dir());
    }

    #[tokio::test]
    async fn test_ensure_parent_dir_bare_file_name() {
        ensure_parent_dir(Path::new("feed.xml")).await.unwrap();
    }
}
