use crate::config::types::{ArchiveConfig, Config, CrawlerConfig, HttpConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    if let Some(archive) = &config.archive {
        validate_archive_config(archive)?;
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", config.base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.file_extension.is_empty() {
        return Err(ConfigError::Validation(
            "file-extension cannot be empty".to_string(),
        ));
    }

    if config.download_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "download-dir cannot be empty".to_string(),
        ));
    }

    if config.max_concurrent_downloads < 1 || config.max_concurrent_downloads > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-downloads must be between 1 and 100, got {}",
            config.max_concurrent_downloads
        )));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates archive configuration
fn validate_archive_config(config: &ArchiveConfig) -> Result<(), ConfigError> {
    for (name, dir) in [
        ("source-dir", &config.source_dir),
        ("target-dir", &config.target_dir),
        ("final-dir", &config.final_dir),
    ] {
        if dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    if config.archive_suffix.is_empty() {
        return Err(ConfigError::Validation(
            "archive-suffix cannot be empty".to_string(),
        ));
    }

    if config.tracked_suffix.is_empty() {
        return Err(ConfigError::Validation(
            "tracked-suffix cannot be empty".to_string(),
        ));
    }

    Ok(())
}
