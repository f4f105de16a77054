//! Immutable run settings
//!
//! `RunSettings` is built once from the config file and the command line,
//! before anything touches the network, and is then shared read-only with
//! every component of the run.

use crate::catalog::LicenseSet;
use crate::config::types::{Config, UserAgentConfig};
use crate::config::validation::{validate, validate_api_key, validate_mode_combination};
use crate::ConfigError;
use std::path::{Path, PathBuf};

/// Where flushed items go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Download each item's image and metadata
    Download,
    /// Append each item's image URL to a file
    UrlList(PathBuf),
}

/// Options given on the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Catalog URLs given as positional arguments
    pub urls: Vec<String>,
    /// File with one catalog URL per line
    pub input_file: Option<PathBuf>,
    /// File to append image URLs to instead of downloading
    pub output_file: Option<PathBuf>,
    pub directory: Option<PathBuf>,
    pub metadata_directory: Option<PathBuf>,
    /// Comma-separated license ids to include
    pub include_licenses: Option<String>,
    /// Comma-separated license ids to exclude
    pub exclude_licenses: Option<String>,
    pub api_key: Option<String>,
}

/// Settings for one run
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub urls: Vec<String>,
    pub output: OutputMode,
    pub download_dir: PathBuf,
    pub metadata_dir: PathBuf,
    pub concurrency: usize,
    pub max_retries: u32,
    pub page_size: u32,
    /// Included license ids; `None` means all known ids
    pub include: Option<LicenseSet>,
    pub exclude: LicenseSet,
    pub api_key: String,
    pub endpoint: String,
    pub user_agent: UserAgentConfig,
}

impl RunSettings {
    /// Merges the config file and command-line options
    ///
    /// Command-line values win. URLs from the input file are appended after
    /// positional URLs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for invalid option combinations, a missing API
    /// key, an unreadable input file or an empty URL list.
    pub fn resolve(config: Config, options: RunOptions) -> Result<Self, ConfigError> {
        validate(&config)?;

        let has_license_filters = config.licenses.is_set()
            || options.include_licenses.is_some()
            || options.exclude_licenses.is_some();
        validate_mode_combination(
            options.input_file.is_some(),
            options.output_file.is_some(),
            has_license_filters,
        )?;

        let api_key = options
            .api_key
            .or(config.api.api_key)
            .ok_or_else(|| {
                ConfigError::Validation(
                    "an API key is required (--api-key, FLICKR_API_KEY or [api] api-key)"
                        .to_string(),
                )
            })?;
        validate_api_key(&api_key)?;

        let mut urls: Vec<String> = options
            .urls
            .iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
        if let Some(input_file) = &options.input_file {
            urls.extend(read_url_list(&expand_home(input_file))?);
        }
        if urls.is_empty() {
            return Err(ConfigError::Validation(
                "no catalog URLs given".to_string(),
            ));
        }

        let download_dir = options
            .directory
            .or(config.download.directory)
            .map(|d| expand_home(&d))
            .unwrap_or_else(default_download_dir);
        let metadata_dir = options
            .metadata_directory
            .or(config.download.metadata_directory)
            .map(|d| expand_home(&d))
            .unwrap_or_else(|| download_dir.clone());

        let include = match options.include_licenses {
            Some(list) => Some(LicenseSet::parse_list(&list)),
            None => config
                .licenses
                .include
                .map(|ids| ids.into_iter().collect()),
        };
        let exclude = match options.exclude_licenses {
            Some(list) => LicenseSet::parse_list(&list),
            None => config.licenses.exclude.into_iter().collect(),
        };

        let output = match options.output_file {
            Some(path) => OutputMode::UrlList(expand_home(&path)),
            None => OutputMode::Download,
        };

        Ok(Self {
            urls,
            output,
            download_dir,
            metadata_dir,
            concurrency: config.download.concurrency,
            max_retries: config.download.max_retries,
            page_size: config.download.page_size,
            include,
            exclude,
            api_key,
            endpoint: config.api.endpoint,
            user_agent: config.user_agent,
        })
    }
}

/// Reads a URL list, one URL per line
///
/// CRLF and CR line endings are accepted; blank lines are skipped.
pub fn read_url_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Expands a leading `~` to the home directory
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// The user's Pictures directory
fn default_download_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
        .unwrap_or_else(|| PathBuf::from("Pictures"))
}
