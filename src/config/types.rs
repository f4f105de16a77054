use crate::catalog::DEFAULT_ENDPOINT;
use serde::Deserialize;
use std::path::PathBuf;

/// Default number of downloads running at once
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default number of extra download attempts after a failure
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default (and largest) catalog page size
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Main configuration file structure for Flickr-Harvest
///
/// Every section is optional; command-line flags override file values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub download: DownloadConfig,
    pub licenses: LicenseFilterConfig,
}

/// Catalog API access
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Flickr API key
    #[serde(rename = "api-key")]
    pub api_key: Option<String>,

    /// REST endpoint URL
    pub endpoint: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the client
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the client
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the client
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,

    /// Email address for contact about the client
    #[serde(rename = "contact-email")]
    pub contact_email: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "flickr-harvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
            contact_email: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `Name/Version` or `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        let base = format!("{}/{}", self.crawler_name, self.crawler_version);
        match (&self.contact_url, &self.contact_email) {
            (Some(url), Some(email)) => format!("{} (+{}; {})", base, url, email),
            (Some(url), None) => format!("{} (+{})", base, url),
            (None, Some(email)) => format!("{} ({})", base, email),
            (None, None) => base,
        }
    }
}

/// Download behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Directory images are saved to
    pub directory: Option<PathBuf>,

    /// Directory metadata files are saved to (defaults to `directory`)
    #[serde(rename = "metadata-directory")]
    pub metadata_directory: Option<PathBuf>,

    /// Number of downloads running at once
    pub concurrency: usize,

    /// Extra attempts after a failed download
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Items requested per catalog page
    #[serde(rename = "page-size")]
    pub page_size: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: None,
            metadata_directory: None,
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: DEFAULT_MAX_RETRIES,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// License filters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LicenseFilterConfig {
    /// License ids to download; all known ids when absent
    pub include: Option<Vec<String>>,

    /// License ids to never download
    pub exclude: Vec<String>,
}

impl LicenseFilterConfig {
    /// Returns true if either filter was set
    pub fn is_set(&self) -> bool {
        self.include.is_some() || !self.exclude.is_empty()
    }
}
