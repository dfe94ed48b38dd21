//! Tracked file relocation
//!
//! Walks the extraction tree and copies every tracked file into one flat
//! destination directory. Subdirectory structure is discarded, so the first
//! file with a given name wins and later ones find the destination taken.

use crate::config::{ArchiveConfig, CopyErrorPolicy};
use crate::{CopyError, HarvestError};
use std::fs::{self, File, Metadata};
use std::io;
use std::path::{Path, PathBuf};

/// Summary of a relocation walk
#[derive(Debug, Default)]
pub struct RelocationReport {
    pub copied: Vec<PathBuf>,
    /// Files whose destination already existed
    pub skipped: usize,
    /// Copies that failed, only populated under [`CopyErrorPolicy::Continue`]
    pub failures: Vec<CopyError>,
}

/// Collects tracked files from the extraction tree
#[derive(Debug, Clone)]
pub struct FileRelocator {
    target_dir: PathBuf,
    final_dir: PathBuf,
    tracked_suffix: String,
    on_copy_error: CopyErrorPolicy,
}

impl FileRelocator {
    pub fn new(
        target_dir: impl Into<PathBuf>,
        final_dir: impl Into<PathBuf>,
        tracked_suffix: impl Into<String>,
        on_copy_error: CopyErrorPolicy,
    ) -> Self {
        Self {
            target_dir: target_dir.into(),
            final_dir: final_dir.into(),
            tracked_suffix: tracked_suffix.into(),
            on_copy_error,
        }
    }

    pub fn from_config(config: &ArchiveConfig) -> Self {
        Self::new(
            &config.target_dir,
            &config.final_dir,
            config.tracked_suffix.as_str(),
            config.on_copy_error,
        )
    }

    /// Copies every tracked file of the extraction tree into the final directory
    ///
    /// Files are visited depth-first in name order. An existing destination
    /// is never overwritten.
    ///
    /// # Errors
    ///
    /// Walk failures are always returned. A failed copy is returned as
    /// [`HarvestError::Copy`] and ends the walk under
    /// [`CopyErrorPolicy::Abort`]; under [`CopyErrorPolicy::Continue`] it is
    /// recorded in the report and the walk goes on.
    pub fn copy_tracked_files(&self) -> Result<RelocationReport, HarvestError> {
        fs::create_dir_all(&self.final_dir).map_err(|source| HarvestError::Io {
            path: self.final_dir.clone(),
            source,
        })?;

        let mut files = Vec::new();
        collect_files(&self.target_dir, &self.tracked_suffix, &mut files)?;

        let mut report = RelocationReport::default();
        for source_path in files {
            let Some(filename) = source_path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let dest = self.final_dir.join(filename);

            if dest.exists() {
                tracing::info!(filename, "Tracked file already exists, skipping");
                report.skipped += 1;
                continue;
            }

            match copy_with_metadata(&source_path, &dest) {
                Ok(()) => {
                    tracing::info!(filename, destination = %self.final_dir.display(), "Copied");
                    report.copied.push(dest);
                }
                Err(source) => {
                    tracing::warn!(filename, error = %source, "Error copying file");
                    let error = CopyError {
                        message: format!("Error copying {}: {}", filename, source),
                        filename: filename.to_string(),
                        source,
                    };
                    match self.on_copy_error {
                        CopyErrorPolicy::Abort => return Err(error.into()),
                        CopyErrorPolicy::Continue => report.failures.push(error),
                    }
                }
            }
        }

        tracing::info!(
            copied = report.copied.len(),
            skipped = report.skipped,
            failed = report.failures.len(),
            "Relocation completed"
        );

        Ok(report)
    }
}

/// Recursively gathers files ending with `suffix`, in name order per directory
fn collect_files(dir: &Path, suffix: &str, files: &mut Vec<PathBuf>) -> Result<(), HarvestError> {
    let io_error = |source| HarvestError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(io_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error)?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let file_type = entry.file_type().map_err(io_error)?;
        let path = entry.path();

        if file_type.is_dir() {
            collect_files(&path, suffix, files)?;
        } else if file_type.is_file()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(suffix))
        {
            files.push(path);
        }
    }

    Ok(())
}

/// Copies contents, modification time and permissions into a new file
///
/// Permissions are applied last through the open handle, so a read-only
/// source still yields a complete copy. A destination created here is
/// removed again if any later step fails.
fn copy_with_metadata(source: &Path, dest: &Path) -> io::Result<()> {
    let mut reader = File::open(source)?;
    let metadata = reader.metadata()?;
    let mut writer = File::options().write(true).create_new(true).open(dest)?;

    let copied = write_copy(&mut reader, &mut writer, &metadata);
    if copied.is_err() {
        drop(writer);
        if let Err(cleanup) = fs::remove_file(dest) {
            tracing::debug!(path = %dest.display(), error = %cleanup, "Could not remove partial copy");
        }
    }
    copied
}

fn write_copy(reader: &mut File, writer: &mut File, metadata: &Metadata) -> io::Result<()> {
    io::copy(reader, writer)?;
    writer.set_modified(metadata.modified()?)?;
    writer.set_permissions(metadata.permissions())
}
