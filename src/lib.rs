//! Flickr-Harvest: a resumable Flickr photo downloader
//!
//! This crate walks a Flickr photostream, photoset, group pool or favorites
//! list page by page, resolves each photo to its best available image, and
//! downloads it with bounded concurrency. Photos that are already fully on
//! disk are skipped, and photos can be filtered by license.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Flickr-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("{failed} of {total} catalog URLs could not be crawled")]
    CrawlIncomplete { failed: usize, total: usize },
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

    #[error("Invalid option combination: {0}")]
    Conflict(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Unknown license id(s) in {filter} filter: {ids}")]
    UnknownLicense { filter: &'static str, ids: String },

    #[error("License filters leave no license allowed")]
    EmptyLicenseSet,
}

/// Errors classifying a catalog URL
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Not a Flickr host: {0}")]
    UnsupportedHost(String),

    #[error("URL doesn't match a supported Flickr URL: {0}")]
    Unrecognized(String),
}

/// Errors talking to the catalog API
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error calling {method}: {source}")]
    Http {
        method: String,
        source: reqwest::Error,
    },

    #[error("{method} failed with code {code}: {message}")]
    Api {
        method: String,
        code: i64,
        message: String,
    },

    #[error("Malformed {method} response: {source}")]
    Decode {
        method: String,
        source: serde_json::Error,
    },

    #[error("{0} not found")]
    NotFound(String),
}

impl CatalogError {
    /// Returns true if the catalog rejected our credentials
    ///
    /// Flickr reports an invalid API key as code 100 and a rejected login
    /// as code 98, on every method.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Api { code, .. } if *code == 100 || *code == 98)
    }
}

/// Result type alias for Flickr-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for catalog operations
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogItem, FlickrCatalog, LicenseSet};
pub use config::{Config, RunSettings};
pub use crawler::{Coordinator, FetchOutcome};
pub use url::{classify_url, CatalogTarget};
