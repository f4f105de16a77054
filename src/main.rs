//! Flickr-Harvest main entry point
//!
//! This is the command-line interface for the Flickr-Harvest downloader.

use anyhow::Context;
use clap::Parser;
use flickr_harvest::config::{load_config_with_hash, Config, OutputMode, RunOptions, RunSettings};
use flickr_harvest::crawler::harvest;
use flickr_harvest::output::print_statistics;
use flickr_harvest::url::classify_all;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Flickr-Harvest: download Flickr photostreams, albums, favorites and group pools
///
/// Each URL is walked page by page. Images are saved with their metadata,
/// already complete files are skipped, and photos can be filtered by license.
#[derive(Parser, Debug)]
#[command(name = "flickr-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Download photos from Flickr", long_about = None)]
struct Cli {
    /// Flickr URLs (photo, photostream, album, favorites or group pool)
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Read Flickr URLs from a file, one per line
    #[arg(short, long, value_name = "FILE")]
    input_file: Option<PathBuf>,

    /// Append image URLs to a file instead of downloading
    #[arg(short, long, value_name = "FILE")]
    output_file: Option<PathBuf>,

    /// Directory to save images to
    #[arg(short, long, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Directory to save metadata to (defaults to the image directory)
    #[arg(short, long, value_name = "DIR")]
    metadata_directory: Option<PathBuf>,

    /// Comma-separated license ids to download
    #[arg(long, value_name = "IDS")]
    include_licenses: Option<String>,

    /// Comma-separated license ids to skip
    #[arg(long, value_name = "IDS")]
    exclude_licenses: Option<String>,

    /// Flickr API key
    #[arg(long, env = "FLICKR_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Show what would be crawled without contacting Flickr
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let options = RunOptions {
        urls: cli.urls,
        input_file: cli.input_file,
        output_file: cli.output_file,
        directory: cli.directory,
        metadata_directory: cli.metadata_directory,
        include_licenses: cli.include_licenses,
        exclude_licenses: cli.exclude_licenses,
        api_key: cli.api_key,
    };
    let settings = RunSettings::resolve(config, options).context("invalid options")?;

    if cli.dry_run {
        return handle_dry_run(&settings);
    }

    handle_harvest(&settings).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("flickr_harvest=info,warn"),
            1 => EnvFilter::new("flickr_harvest=debug,info"),
            2 => EnvFilter::new("flickr_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: classifies URLs and shows the run settings
fn handle_dry_run(settings: &RunSettings) -> anyhow::Result<()> {
    let targets = classify_all(&settings.urls)?;

    println!("=== Flickr-Harvest Dry Run ===\n");

    println!("Output:");
    match &settings.output {
        OutputMode::Download => {
            println!("  Images: {}", settings.download_dir.display());
            println!("  Metadata: {}", settings.metadata_dir.display());
            println!("  Concurrent downloads: {}", settings.concurrency);
            println!("  Retries per image: {}", settings.max_retries);
        }
        OutputMode::UrlList(path) => println!("  URL list: {}", path.display()),
    }

    println!("\nLicenses:");
    match &settings.include {
        Some(include) => println!("  Include: {}", include),
        None => println!("  Include: all"),
    }
    if !settings.exclude.is_empty() {
        println!("  Exclude: {}", settings.exclude);
    }

    println!("\nURLs ({}):", targets.len());
    for (url, target) in &targets {
        println!("  - {} ({})", url, target);
    }

    println!("\n✓ Options are valid");
    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(settings: &RunSettings) -> anyhow::Result<()> {
    tracing::info!("Harvesting {} URLs", settings.urls.len());

    let stats = match harvest(settings).await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    print_statistics(&stats);
    stats.ensure_complete()?;
    Ok(())
}
