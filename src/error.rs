//! Error types shared by the export and feed pipelines.
//!
//! Only conditions that stop a run live here. Problems with an individual
//! header, timestamp or frontmatter block are not errors: they fall back to
//! pass-through text and are logged instead.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions for a single run.
#[derive(Debug, Error)]
pub enum DiaryError {
    /// The diary source (file or directory) does not exist.
    #[error("{} not found", .0.display())]
    SourceMissing(PathBuf),

    #[error("IO error on `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid diary JSON in `{}`", .0.display())]
    Json(PathBuf, #[source] serde_json::Error),

    #[error("invalid config file `{}`", .0.display())]
    Config(PathBuf, #[source] serde_yaml::Error),
}

impl DiaryError {
    /// Map an I/O error for `path`, turning `NotFound` into [`DiaryError::SourceMissing`].
    pub fn from_source_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            DiaryError::SourceMissing(path)
        } else {
            DiaryError::Io(path, err)
        }
    }
}
