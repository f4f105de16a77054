//! Fetch worker: downloads one item
//!
//! A worker never returns an error. Every path ends in a [`FetchOutcome`]
//! so that one bad item cannot stop its siblings or the crawl.

use crate::catalog::{CatalogItem, LicensePolicy};
use crate::crawler::dedup::{metadata_present, should_skip};
use crate::crawler::fetcher::download_to;
use crate::crawler::locator::ResolvedTarget;
use reqwest::Client;
use std::fmt;
use std::path::{Path, PathBuf};

/// Terminal result of one item's work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The image was downloaded
    Downloaded { bytes: u64 },
    /// A complete copy was already on disk
    AlreadyPresent,
    /// The item's license is filtered out
    LicenseExcluded { license: String },
    /// No image URL could be found for the item
    Unresolvable,
    /// Every download attempt failed
    Failed { attempts: u32, error: String },
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Downloaded { bytes } => write!(f, "downloaded {} bytes", bytes),
            Self::AlreadyPresent => write!(f, "already present"),
            Self::LicenseExcluded { license } => write!(f, "license {} excluded", license),
            Self::Unresolvable => write!(f, "no image URL"),
            Self::Failed { attempts, error } => {
                write!(f, "failed after {} attempts: {}", attempts, error)
            }
        }
    }
}

/// Everything a worker needs, shared read-only by all workers of a run
#[derive(Debug, Clone)]
pub struct FetchWorker {
    client: Client,
    download_dir: PathBuf,
    metadata_dir: PathBuf,
    max_retries: u32,
    policy: LicensePolicy,
}

impl FetchWorker {
    /// Creates a worker
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client for HEAD and GET requests
    /// * `download_dir` - Directory images are saved to
    /// * `metadata_dir` - Directory metadata files are saved to
    /// * `max_retries` - Extra attempts after a failed download
    /// * `policy` - License filter
    pub fn new(
        client: Client,
        download_dir: PathBuf,
        metadata_dir: PathBuf,
        max_retries: u32,
        policy: LicensePolicy,
    ) -> Self {
        Self {
            client,
            download_dir,
            metadata_dir,
            max_retries,
            policy,
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn metadata_dir(&self) -> &Path {
        &self.metadata_dir
    }

    /// Processes one item
    ///
    /// 1. License filter
    /// 2. Resolve the image URL and file names
    /// 3. Save metadata unless a metadata file already exists
    /// 4. Skip the image if a complete copy is on disk
    /// 5. Download, retrying up to `max_retries` more times
    pub async fn run(&self, item: CatalogItem) -> FetchOutcome {
        if !self.policy.allows(item.license.as_deref()) {
            let license = item.license.unwrap_or_default();
            tracing::info!("Skipping photo {}: license {} is filtered out", item.id, license);
            return FetchOutcome::LicenseExcluded { license };
        }

        let target = match ResolvedTarget::from_item(&item) {
            Some(t) => t,
            None => {
                tracing::warn!("Image URL not found for photo {}", item.id);
                return FetchOutcome::Unresolvable;
            }
        };

        self.save_metadata(&item, &target).await;

        let image_path = self.download_dir.join(&target.file_name);
        if should_skip(&self.client, &image_path, &target.url).await {
            tracing::info!("Already saved photo {}", target.url);
            return FetchOutcome::AlreadyPresent;
        }

        self.download_with_retries(&target, &image_path).await
    }

    async fn download_with_retries(&self, target: &ResolvedTarget, image_path: &Path) -> FetchOutcome {
        let max_attempts = self.max_retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                tracing::info!(
                    "Retrying {} (attempt {}/{})",
                    target.url,
                    attempt,
                    max_attempts
                );
            }

            match download_to(&self.client, &target.url, image_path).await {
                Ok(bytes) => {
                    tracing::info!("Saved image {} to {}", target.url, target.file_name);
                    return FetchOutcome::Downloaded { bytes };
                }
                Err(e) => {
                    tracing::warn!(
                        "Error getting file {} (attempt {}/{}): {}",
                        target.url,
                        attempt,
                        max_attempts,
                        e
                    );
                    last_error = e.to_string();
                }
            }
        }

        tracing::error!(
            "Giving up on {} after {} attempts: {}",
            target.url,
            max_attempts,
            last_error
        );
        FetchOutcome::Failed {
            attempts: max_attempts,
            error: last_error,
        }
    }

    /// Writes the item's record as JSON if no metadata file exists yet
    ///
    /// Failures are logged and do not stop the image download.
    async fn save_metadata(&self, item: &CatalogItem, target: &ResolvedTarget) {
        let path = self.metadata_dir.join(&target.metadata_file_name);
        if metadata_present(&path).await {
            return;
        }

        tracing::info!(
            "Saving metadata for {} to {}",
            target.url,
            target.metadata_file_name
        );

        let result = match serde_json::to_vec_pretty(item) {
            Ok(json) => write_atomically(&path, &json).await,
            Err(e) => Err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        };

        if let Err(e) = result {
            tracing::warn!(
                "Failed to save metadata for photo {} to {}: {}",
                item.id,
                path.display(),
                e
            );
        }
    }
}

async fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await
}
