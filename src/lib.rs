//! Link-Harvester: fetch a listing page and mirror the files it links to
//!
//! This crate fetches a single HTML page, extracts the links whose path ends
//! with a configured suffix, downloads the matched files concurrently into a
//! local directory, and can afterwards unpack downloaded archives and collect
//! the tracked files they contain into one flat directory.

pub mod archive;
pub mod config;
pub mod crawler;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Link-Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error(transparent)]
    Copy(#[from] CopyError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Raised when a page or a file's bytes cannot be retrieved
#[derive(Debug, Error)]
#[error("{message} (URL: {requested_url})")]
pub struct FetchError {
    pub message: String,
    pub requested_url: String,
    #[source]
    pub source: reqwest::Error,
}

/// Raised when a fetched file could not be written to its target path
#[derive(Debug, Error)]
#[error("{message} (URL: {requested_url}, Path: {})", .desired_path.display())]
pub struct SaveError {
    pub message: String,
    pub requested_url: String,
    pub desired_path: PathBuf,
    #[source]
    pub source: TransferError,
}

/// The step of a download that failed
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Raised when a tracked file cannot be copied to its final destination
#[derive(Debug, Error)]
#[error("{message} (Bad Filename: {filename})")]
pub struct CopyError {
    pub message: String,
    pub filename: String,
    #[source]
    pub source: std::io::Error,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Link-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use archive::{ArchiveExtractor, FileRelocator};
pub use config::Config;
pub use crawler::{CrawlTarget, Crawler};
