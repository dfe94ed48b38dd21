//! Crawler coordinator - crawl run orchestration
//!
//! A crawl run fetches the base page, extracts the matched links and
//! downloads them concurrently. All downloads are driven from a single task
//! and interleave at I/O boundaries; the number in flight is capped.

use crate::config::Config;
use crate::crawler::downloader::{fetch_and_save, DownloadOutcome};
use crate::crawler::fetcher::{build_http_client, fetch_text};
use crate::crawler::parser::extract_links;
use crate::{HarvestError, SaveError};
use futures_util::stream::{self, StreamExt};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Instant;
use url::Url;

/// What a crawl run fetches and where it writes
///
/// Immutable for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    pub base_url: Url,
    pub file_extension: String,
    pub download_dir: PathBuf,
}

impl CrawlTarget {
    /// Builds a target from the `[crawler]` section of a configuration
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        Ok(Self {
            base_url: Url::parse(&config.crawler.base_url)?,
            file_extension: config.crawler.file_extension.clone(),
            download_dir: config.crawler.download_dir.clone(),
        })
    }
}

/// Summary of a finished crawl run
#[derive(Debug, Default)]
pub struct CrawlReport {
    /// Number of matched links found on the base page
    pub links_found: usize,
    /// Files fetched and written during this run
    pub downloaded: Vec<PathBuf>,
    /// Links skipped because the file existed or the name did not match
    pub skipped: usize,
    /// Downloads that failed; siblings were not affected
    pub failures: Vec<SaveError>,
}

/// Main crawler structure
pub struct Crawler {
    target: CrawlTarget,
    client: Client,
    max_concurrent_downloads: usize,
}

impl Crawler {
    /// Creates a crawler with its own HTTP client built from `config`
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let target = CrawlTarget::from_config(config)?;
        let client = build_http_client(&config.http)?;
        Ok(Self::with_client(
            target,
            client,
            config.crawler.max_concurrent_downloads as usize,
        ))
    }

    /// Creates a crawler around an existing client
    pub fn with_client(target: CrawlTarget, client: Client, max_concurrent_downloads: usize) -> Self {
        Self {
            target,
            client,
            max_concurrent_downloads: max_concurrent_downloads.max(1),
        }
    }

    /// Runs one crawl to completion
    ///
    /// # Process
    ///
    /// 1. Create the download directory
    /// 2. Fetch the base page; a failure here ends the run with an error
    /// 3. An empty page ends the run with nothing downloaded
    /// 4. Extract matched links and download them, at most
    ///    `max_concurrent_downloads` at a time
    /// 5. Wait for every download; a failed download is logged and recorded
    ///    in the report without affecting the others
    pub async fn run(&self) -> Result<CrawlReport, HarvestError> {
        let start_time = Instant::now();
        let target = &self.target;

        std::fs::create_dir_all(&target.download_dir).map_err(|source| HarvestError::Io {
            path: target.download_dir.clone(),
            source,
        })?;

        tracing::info!(url = %target.base_url, "Crawling");
        let content = fetch_text(&self.client, target.base_url.as_str()).await?;

        let mut report = CrawlReport::default();
        if content.trim().is_empty() {
            tracing::info!(url = %target.base_url, "Base page is empty, nothing to download");
            return Ok(report);
        }

        let links = extract_links(&content, &target.base_url, &target.file_extension);
        report.links_found = links.len();
        tracing::info!(
            count = links.len(),
            suffix = %target.file_extension,
            "Found matching links"
        );

        let mut results = stream::iter(links.iter())
            .map(|link| {
                fetch_and_save(
                    &self.client,
                    link,
                    &target.download_dir,
                    &target.file_extension,
                )
            })
            .buffer_unordered(self.max_concurrent_downloads);

        while let Some(result) = results.next().await {
            match result {
                Ok(DownloadOutcome::Downloaded { path, .. }) => report.downloaded.push(path),
                Ok(DownloadOutcome::AlreadyPresent { .. })
                | Ok(DownloadOutcome::SuffixMismatch { .. }) => report.skipped += 1,
                Err(e) => report.failures.push(e),
            }
        }

        tracing::info!(
            downloaded = report.downloaded.len(),
            skipped = report.skipped,
            failed = report.failures.len(),
            elapsed = ?start_time.elapsed(),
            "Crawl completed"
        );

        Ok(report)
    }
}
