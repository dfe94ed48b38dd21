use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Link-Harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    /// Only required by the `unzip` and `relocate` commands
    pub archive: Option<ArchiveConfig>,
}

/// Crawl run configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// The listing page whose links are harvested
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Suffix a link's path must end with to be downloaded (e.g. ".pgn")
    #[serde(rename = "file-extension")]
    pub file_extension: String,

    /// Directory the matched files are written into
    #[serde(rename = "download-dir", default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Maximum number of downloads in flight at once
    #[serde(
        rename = "max-concurrent-downloads",
        default = "default_max_concurrent_downloads"
    )]
    pub max_concurrent_downloads: u32,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Total request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Archive extraction and relocation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    /// Directory scanned for archives
    #[serde(rename = "source-dir", default = "default_download_dir")]
    pub source_dir: PathBuf,

    /// Directory receiving one subdirectory per extracted archive
    #[serde(rename = "target-dir", default = "default_target_dir")]
    pub target_dir: PathBuf,

    /// Flat destination for relocated tracked files. No default.
    #[serde(rename = "final-dir")]
    pub final_dir: PathBuf,

    #[serde(rename = "archive-suffix", default = "default_archive_suffix")]
    pub archive_suffix: String,

    #[serde(rename = "tracked-suffix", default = "default_tracked_suffix")]
    pub tracked_suffix: String,

    #[serde(rename = "on-copy-error", default)]
    pub on_copy_error: CopyErrorPolicy,
}

/// What relocation does when a single copy fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CopyErrorPolicy {
    /// Stop the walk and return the error
    #[default]
    Abort,
    /// Log the error, record it in the report, keep walking
    Continue,
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_target_dir() -> PathBuf {
    PathBuf::from("unzipped")
}

fn default_max_concurrent_downloads() -> u32 {
    8
}

fn default_user_agent() -> String {
    format!("link-harvester/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_archive_suffix() -> String {
    ".zip".to_string()
}

fn default_tracked_suffix() -> String {
    ".pgn".to_string()
}
