//! Single-file download with skip-if-present semantics
//!
//! The presence of the target file is the only record that a download
//! completed; there is no manifest. Running a download twice transfers
//! the file at most once.

use crate::crawler::fetcher::fetch_bytes;
use crate::{SaveError, TransferError};
use reqwest::Client;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use url::Url;

/// Result of a download that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The file was fetched and written
    Downloaded {
        path: PathBuf,
        /// Number of bytes written
        bytes: usize,
    },

    /// A file already exists at the target path; nothing was fetched
    AlreadyPresent { path: PathBuf },

    /// The URL's last path segment does not end with the suffix
    SuffixMismatch { filename: String },
}

/// Returns the last path segment of a URL, as it appears in the URL
///
/// A URL whose path ends with `/` yields an empty name.
pub fn derive_filename(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default()
        .to_string()
}

/// Downloads `url` into `target_dir` unless it is filtered out or already present
///
/// # Steps
///
/// 1. Derive the filename from the last path segment; no-op if it does not
///    end with `suffix`
/// 2. Skip if `target_dir/filename` exists
/// 3. GET the body, then create the file and write it
///
/// The target file is opened with create-new semantics, so two concurrent
/// downloads of the same filename never overwrite one another: the loser
/// reports [`DownloadOutcome::AlreadyPresent`]. A write that fails midway
/// removes the partial file.
///
/// # Errors
///
/// Returns a [`SaveError`] carrying the URL and the computed target path
/// when the GET or the write fails.
pub async fn fetch_and_save(
    client: &Client,
    url: &Url,
    target_dir: &Path,
    suffix: &str,
) -> Result<DownloadOutcome, SaveError> {
    let filename = derive_filename(url);
    if filename.is_empty() || !filename.ends_with(suffix) {
        tracing::debug!(url = %url, suffix, "Filename does not match suffix, ignoring");
        return Ok(DownloadOutcome::SuffixMismatch { filename });
    }

    // Computed before any network activity so every error carries it
    let filepath = target_dir.join(&filename);

    match fs::try_exists(&filepath).await {
        Ok(true) => {
            tracing::info!(filename = %filename, "File already exists, skipping");
            return Ok(DownloadOutcome::AlreadyPresent { path: filepath });
        }
        Ok(false) => {}
        // The create-new open below settles whether the path is usable
        Err(e) => {
            tracing::debug!(path = %filepath.display(), error = %e, "Could not check for existing file");
        }
    }

    let save_error = |source: TransferError| {
        tracing::warn!(url = %url, path = %filepath.display(), error = %source, "Error downloading file");
        SaveError {
            message: format!("Failed to save file {}", filename),
            requested_url: url.to_string(),
            desired_path: filepath.clone(),
            source,
        }
    };

    let body = fetch_bytes(client, url.as_str())
        .await
        .map_err(|e| save_error(e.into()))?;

    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&filepath)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            tracing::info!(filename = %filename, "File appeared during download, skipping");
            return Ok(DownloadOutcome::AlreadyPresent { path: filepath });
        }
        Err(e) => return Err(save_error(e.into())),
    };

    let written = async {
        file.write_all(&body).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        if let Err(cleanup) = fs::remove_file(&filepath).await {
            tracing::debug!(path = %filepath.display(), error = %cleanup, "Could not remove partial file");
        }
        return Err(save_error(e.into()));
    }

    tracing::info!(filename = %filename, bytes = body.len(), "Downloaded");
    Ok(DownloadOutcome::Downloaded {
        path: filepath,
        bytes: body.len(),
    })
}
