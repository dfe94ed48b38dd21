//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the shared HTTP client with user agent and timeouts
//! - GET requests returning a page body as text
//! - GET requests returning a file body as bytes
//!
//! There is no retry. Every failure is reported once, to the caller.

use crate::config::HttpConfig;
use crate::FetchError;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// One client is built per run and shared by every request of that run;
/// its connection pool is safe for concurrent use.
///
/// # Example
///
/// ```no_run
/// use link_harvester::config::HttpConfig;
/// use link_harvester::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its body decoded as text
///
/// Fails with a [`FetchError`] on a network error, a non-success status,
/// or a body that cannot be decoded.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = send_get(client, url).await?;

    response.text().await.map_err(|e| {
        tracing::warn!(url, error = %e, "Error decoding response body");
        fetch_error(url, e)
    })
}

/// Fetches a URL and returns its raw body
pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>, reqwest::Error> {
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}

async fn send_get(client: &Client, url: &str) -> Result<reqwest::Response, FetchError> {
    client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| {
            tracing::warn!(url, error = %e, "Error fetching page");
            fetch_error(url, e)
        })
}

fn fetch_error(url: &str, source: reqwest::Error) -> FetchError {
    FetchError {
        message: format!("Failed to fetch content from {}", url),
        requested_url: url.to_string(),
        source,
    }
}
