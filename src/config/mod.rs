//! Configuration module for Flickr-Harvest
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, and merging it with command-line options into the
//! immutable [`RunSettings`] for a run.
//!
//! # Example
//!
//! ```no_run
//! use flickr_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Downloads run {} at a time", config.download.concurrency);
//! ```

mod parser;
mod settings;
mod types;
mod validation;

// Re-export types
pub use settings::{read_url_list, OutputMode, RunOptions, RunSettings};
pub use types::{
    ApiConfig, Config, DownloadConfig, LicenseFilterConfig, UserAgentConfig, DEFAULT_CONCURRENCY,
    DEFAULT_MAX_RETRIES, DEFAULT_PAGE_SIZE,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
