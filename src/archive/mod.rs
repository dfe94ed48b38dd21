//! Post-download processing of archives
//!
//! Both steps are sequential, idempotent directory walks and are run on
//! demand, independently of a crawl:
//! - `ArchiveExtractor` unpacks downloaded archives, skipping corrupt ones
//! - `FileRelocator` gathers tracked files into a flat destination

mod extractor;
mod relocator;

pub use extractor::{extract_archive, ArchiveExtractor, ExtractOutcome, UnzipReport};
pub use relocator::{FileRelocator, RelocationReport};
