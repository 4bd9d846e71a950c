//! Command-line interface definitions for diary_feed.
//!
//! Two subcommands, one per pipeline. Path flags can also be supplied through
//! environment variables, and any flag left unset falls back to the
//! `--config` file and then to the built-in defaults.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Diary file -> JSON
/// diary_feed export --source diary.md --output site/diary_entries.json
///
/// # Directory of numbered entries -> JSON
/// diary_feed export --source entries/
///
/// # JSON -> RSS, 30 newest entries
/// diary_feed feed --input site/diary_entries.json --output site/feed.xml --max-items 30
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, global = true, env = "DIARY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract diary entries into the website's JSON document
    Export(ExportArgs),
    /// Render the JSON document as an RSS 2.0 feed
    Feed(FeedArgs),
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Diary file, or directory of per-entry Markdown files
    #[arg(short, long, env = "DIARY_SOURCE")]
    pub source: Option<PathBuf>,

    /// Where to write the JSON document
    #[arg(short, long, env = "DIARY_JSON")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FeedArgs {
    /// JSON document produced by `export`
    #[arg(short, long, env = "DIARY_JSON")]
    pub input: Option<PathBuf>,

    /// Where to write the RSS feed
    #[arg(short, long, env = "DIARY_FEED")]
    pub output: Option<PathBuf>,

    /// Number of most recent entries to include
    #[arg(short = 'n', long)]
    pub max_items: Option<usize>,

    /// Maximum description length in characters
    #[arg(long)]
    pub description_limit: Option<usize>,

    /// Site base URL used for item permalinks
    #[arg(long)]
    pub site_url: Option<String>,
}
