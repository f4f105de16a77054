//! Crawler coordinator - walks each catalog listing page by page
//!
//! For every classified URL the coordinator:
//! - Resolves the listing's container id and item count
//! - Requests pages 1..=n strictly one at a time
//! - Hands each page's items to the output sink before asking for the next
//!
//! A single photo URL is fetched directly and flushed as a one-item batch.

use crate::catalog::{Catalog, CatalogItem, PAGE_EXTRAS};
use crate::output::{OutputSink, RunStats};
use crate::url::CatalogTarget;
use crate::HarvestError;
use std::sync::Arc;

/// Number of pages needed to list `total` items
///
/// # Examples
///
/// ```
/// use flickr_harvest::crawler::page_count;
///
/// assert_eq!(page_count(0, 500), 0);
/// assert_eq!(page_count(500, 500), 1);
/// assert_eq!(page_count(501, 500), 2);
/// ```
pub fn page_count(total: u64, page_size: u32) -> u64 {
    total.div_ceil(u64::from(page_size.max(1)))
}

/// Main crawl driver
pub struct Coordinator {
    catalog: Arc<dyn Catalog>,
    sink: OutputSink,
    page_size: u32,
    batch: Vec<CatalogItem>,
    stats: RunStats,
}

impl Coordinator {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `catalog` - The remote listing to crawl
    /// * `sink` - Where each page's items go
    /// * `page_size` - Items requested per page
    pub fn new(catalog: Arc<dyn Catalog>, sink: OutputSink, page_size: u32) -> Self {
        Self {
            catalog,
            sink,
            page_size,
            batch: Vec::new(),
            stats: RunStats::new(),
        }
    }

    /// Crawls every target in order
    ///
    /// A catalog error on one URL is logged and the next URL is crawled;
    /// the failure is counted in the returned statistics.
    ///
    /// # Errors
    ///
    /// * `HarvestError::Authentication` - The catalog rejected the credentials
    /// * `HarvestError::Io` - Output could not be written
    pub async fn run(mut self, targets: Vec<(String, CatalogTarget)>) -> Result<RunStats, HarvestError> {
        let total = targets.len();

        for (index, (url, target)) in targets.iter().enumerate() {
            tracing::info!(
                "Crawling {} ({}) [{}/{}]",
                url,
                target.kind(),
                index + 1,
                total
            );

            match self.crawl_target(target).await {
                Ok(()) => self.stats.urls_crawled += 1,
                Err(HarvestError::Catalog(e)) if e.is_authentication() => {
                    return Err(HarvestError::Authentication(e.to_string()));
                }
                Err(HarvestError::Catalog(e)) => {
                    tracing::error!("Failed to crawl {}: {}", url, e);
                    self.stats.urls_failed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        self.stats.finish();
        tracing::info!(
            "Crawl completed: {} pages, {} items from {} URLs",
            self.stats.pages_requested,
            self.stats.items_enumerated,
            self.stats.urls_crawled
        );

        Ok(self.stats)
    }

    async fn crawl_target(&mut self, target: &CatalogTarget) -> Result<(), HarvestError> {
        if let CatalogTarget::Photo { photo_id } = target {
            let item = self.catalog.get_item(photo_id).await?;
            self.stats.items_enumerated += 1;
            self.batch.push(item);
            return self.flush().await;
        }

        let container = self.catalog.lookup_container(target).await?;
        let total = self.catalog.item_count(&container).await?;
        let pages = page_count(total, self.page_size);

        tracing::info!(
            "Found {} items in {} ({} pages)",
            total,
            container,
            pages
        );

        for page in 1..=pages {
            let items = self
                .catalog
                .get_page(&container, page, self.page_size, PAGE_EXTRAS)
                .await?;

            self.stats.pages_requested += 1;
            self.stats.items_enumerated += items.len() as u64;
            tracing::info!("Page {}/{} of {}: {} items", page, pages, container, items.len());

            self.batch.extend(items);
            self.flush().await?;
        }

        Ok(())
    }

    /// Hands the buffered items to the sink and clears the buffer
    async fn flush(&mut self) -> Result<(), HarvestError> {
        self.sink.process(&mut self.batch, &mut self.stats).await?;
        Ok(())
    }
}
