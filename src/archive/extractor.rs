//! Archive extraction
//!
//! Every archive in the source directory is unpacked into its own
//! subdirectory of the target directory, named after the archive without
//! its suffix. An existing subdirectory means the archive was already
//! handled and it is left alone.

use crate::config::ArchiveConfig;
use crate::HarvestError;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Result of handling one archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// The archive was unpacked into `destination`
    Extracted {
        archive: PathBuf,
        destination: PathBuf,
        entries: usize,
    },

    /// The destination already exists; nothing was read
    AlreadyExtracted,

    /// The archive could not be read; any partial output was removed
    Corrupt { reason: String },
}

/// Summary of an extraction walk
#[derive(Debug, Default)]
pub struct UnzipReport {
    pub extracted: Vec<PathBuf>,
    pub skipped: usize,
    /// Archives that could not be read
    pub corrupt: Vec<PathBuf>,
}

/// Unpacks the archives found in one directory
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    source_dir: PathBuf,
    target_dir: PathBuf,
    archive_suffix: String,
}

impl ArchiveExtractor {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        target_dir: impl Into<PathBuf>,
        archive_suffix: impl Into<String>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            target_dir: target_dir.into(),
            archive_suffix: archive_suffix.into(),
        }
    }

    pub fn from_config(config: &ArchiveConfig) -> Self {
        Self::new(
            &config.source_dir,
            &config.target_dir,
            config.archive_suffix.as_str(),
        )
    }

    /// Extracts every archive of the source directory not yet extracted
    ///
    /// Entries are visited in name order. A corrupt archive is logged and
    /// skipped; the walk continues with the next one.
    ///
    /// # Errors
    ///
    /// Fails only when the target directory cannot be created or the
    /// source directory cannot be listed.
    pub fn unzip_files(&self) -> Result<UnzipReport, HarvestError> {
        fs::create_dir_all(&self.target_dir).map_err(|source| HarvestError::Io {
            path: self.target_dir.clone(),
            source,
        })?;

        let mut report = UnzipReport::default();

        for archive_path in self.list_archives()? {
            let Some(stem) = archive_path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_suffix(self.archive_suffix.as_str()))
            else {
                continue;
            };
            let extract_path = self.target_dir.join(stem);

            match extract_archive(&archive_path, &extract_path) {
                ExtractOutcome::Extracted { destination, .. } => report.extracted.push(destination),
                ExtractOutcome::AlreadyExtracted => report.skipped += 1,
                ExtractOutcome::Corrupt { .. } => report.corrupt.push(archive_path),
            }
        }

        tracing::info!(
            extracted = report.extracted.len(),
            skipped = report.skipped,
            corrupt = report.corrupt.len(),
            "Extraction completed"
        );

        Ok(report)
    }

    /// Regular files of the source directory ending with the archive suffix
    fn list_archives(&self) -> Result<Vec<PathBuf>, HarvestError> {
        let io_error = |source| HarvestError::Io {
            path: self.source_dir.clone(),
            source,
        };

        let mut archives = Vec::new();
        for entry in fs::read_dir(&self.source_dir).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            let is_archive = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(self.archive_suffix.as_str()));

            if is_archive && entry.file_type().map_err(io_error)?.is_file() {
                archives.push(entry.path());
            }
        }

        archives.sort();
        Ok(archives)
    }
}

/// Extracts one archive into `extract_path` unless that path already exists
pub fn extract_archive(archive_path: &Path, extract_path: &Path) -> ExtractOutcome {
    if extract_path.exists() {
        tracing::info!(archive = %archive_path.display(), "Already unzipped, skipping");
        return ExtractOutcome::AlreadyExtracted;
    }

    let result = File::open(archive_path)
        .map_err(zip::result::ZipError::from)
        .and_then(ZipArchive::new)
        .and_then(|mut archive| {
            fs::create_dir_all(extract_path)?;
            archive.extract(extract_path)?;
            Ok(archive.len())
        });

    match result {
        Ok(entries) => {
            tracing::info!(
                archive = %archive_path.display(),
                destination = %extract_path.display(),
                entries,
                "Unzipped"
            );
            ExtractOutcome::Extracted {
                archive: archive_path.to_path_buf(),
                destination: extract_path.to_path_buf(),
                entries,
            }
        }
        Err(e) => {
            tracing::warn!(archive = %archive_path.display(), error = %e, "Bad zip file, skipping");
            if extract_path.exists() {
                if let Err(cleanup) = fs::remove_dir_all(extract_path) {
                    tracing::warn!(
                        path = %extract_path.display(),
                        error = %cleanup,
                        "Could not remove partial extraction"
                    );
                }
            }
            ExtractOutcome::Corrupt {
                reason: e.to_string(),
            }
        }
    }
}
