//! Configuration module for Link-Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use link_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawling {}", config.crawler.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ArchiveConfig, Config, CopyErrorPolicy, CrawlerConfig, HttpConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
