//! # diary_feed
//!
//! Converts a Markdown diary into the JSON document read by a static website,
//! and renders that document as an RSS 2.0 feed.
//!
//! ## Usage
//!
//! ```sh
//! diary_feed export -s diary.md -o site/diary_entries.json
//! diary_feed feed -i site/diary_entries.json -o site/feed.xml
//! ```
//!
//! ## Architecture
//!
//! Two independent pipelines that share only the JSON file:
//! 1. **Export**: read the diary (one file, or a directory with one file per
//!    entry), split it into entries, normalize timestamps, write JSON
//! 2. **Feed**: read the JSON, pick the newest entries, write RSS
//!
//! Each run reads its input fully, transforms it in memory and overwrites its
//! output. On a fatal error the previous output is left untouched.

use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod extract;
mod models;
mod outputs;
mod timestamp;
mod utils;

use cli::{Cli, Command, ExportArgs, FeedArgs};
use config::AppConfig;
use extract::Extractor;
use outputs::{feed, json};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    match run(args).await {
        Ok(summary) => {
            let elapsed = start_time.elapsed();
            info!(?elapsed, "Execution complete");
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            eprintln!("Error: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

/// Execute one subcommand and return the one-line summary for stdout.
async fn run(args: Cli) -> Result<String, Box<dyn Error>> {
    let config = AppConfig::load(args.config.as_deref()).await?;
    match args.command {
        Command::Export(export_args) => run_export(export_args, &config).await,
        Command::Feed(feed_args) => run_feed(feed_args, config).await,
    }
}

async fn run_export(args: ExportArgs, config: &AppConfig) -> Result<String, Box<dyn Error>> {
    let source = args.source.unwrap_or_else(|| config.source_or_default());
    let output = args.output.unwrap_or_else(|| config.entries_json_or_default());
    info!(source = %source.display(), output = %output.display(), "Exporting diary");

    let entries = Extractor::default().extract(&source).await?;
    json::write_entries(&entries, &output).await?;

    Ok(format!(
        "Exported {} diary entries to {}",
        entries.len(),
        output.display()
    ))
}

async fn run_feed(args: FeedArgs, config: AppConfig) -> Result<String, Box<dyn Error>> {
    let input = args.input.unwrap_or_else(|| config.entries_json_or_default());
    let output = args.output.unwrap_or_else(|| config.feed_output_or_default());

    let mut feed_config = config.feed;
    if let Some(max_items) = args.max_items {
        feed_config.max_items = max_items;
    }
    if let Some(limit) = args.description_limit {
        feed_config.description_limit = limit;
    }
    if let Some(site_url) = args.site_url {
        feed_config.site_url = site_url;
    }
    info!(input = %input.display(), output = %output.display(), max_items = feed_config.max_items, "Rendering feed");

    let document = json::read_document(&input).await?;
    let count = feed::write_feed(&document.entries, &feed_config, &output).await?;

    Ok(format!("Generated {} with {} items", output.display(), count))
}
