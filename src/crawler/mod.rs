//! Crawler module for page fetching and file downloading
//!
//! This module contains the crawl pipeline:
//! - HTTP fetching with a shared, timeout-bounded client
//! - HTML parsing and suffix-filtered link extraction
//! - Idempotent single-file downloads
//! - Crawl run coordination with bounded concurrency

mod coordinator;
mod downloader;
mod fetcher;
mod parser;

pub use coordinator::{CrawlReport, CrawlTarget, Crawler};
pub use downloader::{derive_filename, fetch_and_save, DownloadOutcome};
pub use fetcher::{build_http_client, fetch_bytes, fetch_text};
pub use parser::extract_links;

use crate::config::Config;
use crate::HarvestError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client
/// 2. Fetch the base page and extract matched links
/// 3. Download every matched file not already on disk
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The run finished; individual download failures are in the report
/// * `Err(HarvestError)` - The base page could not be fetched or setup failed
pub async fn crawl(config: &Config) -> Result<CrawlReport, HarvestError> {
    Crawler::new(config)?.run().await
}
