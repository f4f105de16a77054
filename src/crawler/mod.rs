//! Crawler module: from catalog URLs to files on disk
//!
//! This module contains the core harvesting logic, including:
//! - Resolving each item to its best image URL and file names
//! - Skipping files that are already complete on disk
//! - Downloading with bounded retries and bounded concurrency
//! - Walking paged catalog listings

mod coordinator;
mod dedup;
mod fetcher;
mod locator;
mod scheduler;
mod worker;

pub use coordinator::{page_count, Coordinator};
pub use dedup::{metadata_present, should_skip, sizes_match};
pub use fetcher::{
    build_download_client, build_http_client, download_to, head_content_length, FetchError,
};
pub use locator::{base_name, resolve, Provenance, Rendition, ResolvedTarget, METADATA_SUFFIX};
pub use scheduler::BatchScheduler;
pub use worker::{FetchOutcome, FetchWorker};

use crate::catalog::{load_license_table, Catalog, FlickrCatalog, LicensePolicy, LicenseSet};
use crate::config::{OutputMode, RunSettings};
use crate::output::{OutputSink, RunStats, UrlListWriter};
use crate::url::classify_all;
use crate::{ConfigError, HarvestError};
use reqwest::Client;
use std::sync::Arc;

/// Runs a complete harvest against the Flickr API
///
/// # Arguments
///
/// * `settings` - The immutable run settings
///
/// # Returns
///
/// * `Ok(RunStats)` - Every URL was processed; check `urls_failed`
/// * `Err(HarvestError)` - A fatal error stopped the run
pub async fn harvest(settings: &RunSettings) -> Result<RunStats, HarvestError> {
    let api_client = build_http_client(&settings.user_agent)?;
    let catalog = FlickrCatalog::new(api_client, &settings.endpoint, settings.api_key.as_str())
        .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", settings.endpoint, e)))?;

    let download_client = build_download_client(&settings.user_agent)?;
    run_with_catalog(settings, Arc::new(catalog), download_client).await
}

/// Runs a harvest against any catalog
///
/// This is the main entry point. It will:
/// 1. Classify every URL, failing before any request on an unsupported one
/// 2. Check the catalog credentials
/// 3. Load the license table and validate the license filters
/// 4. Open the output sink
/// 5. Crawl each URL in order
pub async fn run_with_catalog(
    settings: &RunSettings,
    catalog: Arc<dyn Catalog>,
    client: Client,
) -> Result<RunStats, HarvestError> {
    let targets = classify_all(&settings.urls)?;

    if let Err(e) = catalog.verify_credentials().await {
        if e.is_authentication() {
            return Err(HarvestError::Authentication(e.to_string()));
        }
        return Err(e.into());
    }

    let universe = LicenseSet::from_table(&load_license_table(&*catalog).await);
    let policy = LicensePolicy::build(&universe, settings.include.as_ref(), &settings.exclude)?;
    tracing::info!("Allowed licenses: {}", policy.allowed());

    let sink = match &settings.output {
        OutputMode::Download => {
            tracing::info!(
                "Downloading to {} (metadata in {})",
                settings.download_dir.display(),
                settings.metadata_dir.display()
            );
            let worker = FetchWorker::new(
                client,
                settings.download_dir.clone(),
                settings.metadata_dir.clone(),
                settings.max_retries,
                policy,
            );
            OutputSink::Download(BatchScheduler::new(worker, settings.concurrency))
        }
        OutputMode::UrlList(path) => OutputSink::UrlList(UrlListWriter::open(path).await?),
    };

    Coordinator::new(catalog, sink, settings.page_size)
        .run(targets)
        .await
}
