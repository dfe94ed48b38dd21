//! Link-Harvester main entry point
//!
//! This is the command-line interface for Link-Harvester.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use link_harvester::archive::{ArchiveExtractor, FileRelocator};
use link_harvester::config::{load_config, ArchiveConfig, Config};
use link_harvester::crawler::crawl;
use link_harvester::ConfigError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Link-Harvester: mirror the files a listing page links to
///
/// Fetches one page, downloads every linked file whose name ends with the
/// configured extension, and can unpack the downloaded archives and gather
/// the tracked files they contain.
#[derive(Parser, Debug)]
#[command(name = "link-harvester")]
#[command(version)]
#[command(about = "Mirror the files a listing page links to", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the base page and download every matching file
    Crawl,
    /// Extract downloaded archives into the target directory
    Unzip,
    /// Copy tracked files from the extraction tree into the final directory
    Relocate,
    /// Validate the configuration and show what would run
    Check,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    match cli.command {
        Command::Crawl => handle_crawl(&config).await,
        Command::Unzip => handle_unzip(&config),
        Command::Relocate => handle_relocate(&config),
        Command::Check => {
            handle_check(&config);
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_harvester=info,warn"),
            1 => EnvFilter::new("link_harvester=debug,info"),
            2 => EnvFilter::new("link_harvester=trace,debug"),
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

fn archive_section(config: &Config) -> Result<&ArchiveConfig> {
    config.archive.as_ref().ok_or_else(|| {
        ConfigError::Validation("an [archive] section is required for this command".to_string())
            .into()
    })
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> Result<()> {
    let report = crawl(config).await.context("Crawl failed")?;

    for failure in &report.failures {
        tracing::warn!("{}", failure);
    }

    tracing::info!(
        "Crawl finished: {} links, {} downloaded, {} skipped, {} failed",
        report.links_found,
        report.downloaded.len(),
        report.skipped,
        report.failures.len()
    );
    Ok(())
}

fn handle_unzip(config: &Config) -> Result<()> {
    let archive = archive_section(config)?;
    let report = ArchiveExtractor::from_config(archive)
        .unzip_files()
        .context("Extraction failed")?;

    for corrupt in &report.corrupt {
        tracing::warn!("Skipped unreadable archive: {}", corrupt.display());
    }
    Ok(())
}

fn handle_relocate(config: &Config) -> Result<()> {
    let archive = archive_section(config)?;
    let report = FileRelocator::from_config(archive)
        .copy_tracked_files()
        .context("Relocation failed")?;

    for failure in &report.failures {
        tracing::warn!("{}", failure);
    }
    Ok(())
}

/// Handles the check command: shows the validated configuration
fn handle_check(config: &Config) {
    println!("=== Link-Harvester Configuration ===\n");

    println!("Crawler:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  File extension: {}", config.crawler.file_extension);
    println!("  Download dir: {}", config.crawler.download_dir.display());
    println!(
        "  Max concurrent downloads: {}",
        config.crawler.max_concurrent_downloads
    );

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!("  Connect timeout: {}s", config.http.connect_timeout_secs);

    match &config.archive {
        Some(archive) => {
            println!("\nArchive:");
            println!("  Source dir: {}", archive.source_dir.display());
            println!("  Target dir: {}", archive.target_dir.display());
            println!("  Final dir: {}", archive.final_dir.display());
            println!("  Archive suffix: {}", archive.archive_suffix);
            println!("  Tracked suffix: {}", archive.tracked_suffix);
            println!("  On copy error: {:?}", archive.on_copy_error);
        }
        None => println!("\nArchive: not configured (unzip and relocate unavailable)"),
    }

    println!("\n✓ Configuration is valid");
}
