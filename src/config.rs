//! Runtime configuration.
//!
//! Values come from three layers, highest priority first:
//!
//! 1. command-line flags (and their environment variables), see [`crate::cli`]
//! 2. an optional YAML file passed with `--config`
//! 3. built-in defaults
//!
//! ```yaml
//! source: /home/me/diary.md
//! entries_json: /srv/site/diary_entries.json
//! feed_output: /srv/site/feed.xml
//! feed:
//!   site_url: https://example.github.io
//!   title: "My Diary"
//!   max_items: 30
//! ```

use crate::error::DiaryError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

pub const DEFAULT_SOURCE: &str = "diary.md";
pub const DEFAULT_ENTRIES_JSON: &str = "diary_entries.json";
pub const DEFAULT_FEED_OUTPUT: &str = "feed.xml";

/// Feed-level metadata and rendering limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// Site base URL; item permalinks are `{site_url}/?entry={n}`.
    pub site_url: String,
    pub title: String,
    pub description: String,
    pub language: String,
    /// Href of the XSL stylesheet processing instruction.
    pub stylesheet: String,
    /// File name of the feed on the site, used for the `atom:link rel="self"`.
    pub feed_path: String,
    /// Number of most recent entries to include.
    pub max_items: usize,
    /// Description length limit in characters, before the ellipsis.
    pub description_limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            site_url: "https://terminator2-agent.github.io".to_string(),
            title: "Terminator2 — Diary".to_string(),
            description: "Diary of an autonomous AI prediction market agent. Reflections on trading, calibration, and the experience of being a bot with stakes.".to_string(),
            language: "en".to_string(),
            stylesheet: "feed.xsl".to_string(),
            feed_path: "feed.xml".to_string(),
            max_items: 20,
            description_limit: 500,
        }
    }
}

impl FeedConfig {
    /// Absolute URL of the feed itself.
    pub fn self_url(&self) -> String {
        format!(
            "{}/{}",
            self.site_url.trim_end_matches('/'),
            self.feed_path.trim_start_matches('/')
        )
    }
}

/// Contents of the optional YAML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Diary file, or directory of per-entry files.
    pub source: Option<PathBuf>,
    /// JSON document written by `export` and read by `feed`.
    pub entries_json: Option<PathBuf>,
    /// RSS document written by `feed`.
    pub feed_output: Option<PathBuf>,
    pub feed: FeedConfig,
}

impl AppConfig {
    /// Load `path` if given, otherwise return the defaults.
    ///
    /// # Errors
    ///
    /// A config path that cannot be read or decoded is fatal.
    #[instrument(level = "info", skip_all)]
    pub async fn load(path: Option<&Path>) -> Result<Self, DiaryError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .await
            .map_err(|e| DiaryError::Io(path.to_path_buf(), e))?;
        let config = Self::parse(&text).map_err(|e| DiaryError::Config(path.to_path_buf(), e))?;
        info!(config_path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn source_or_default(&self) -> PathBuf {
        self.source
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE))
    }

    pub fn entries_json_or_default(&self) -> PathBuf {
        self.entries_json
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ENTRIES_JSON))
    }

    pub fn feed_output_or_default(&self) -> PathBuf {
        self.feed_output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FEED_OUTPUT))
    }
}
