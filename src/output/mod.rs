//! Output module: where flushed batches go
//!
//! This module handles:
//! - Handing batches to the batch scheduler for download
//! - Writing image URLs to a list file instead of downloading
//! - Recording run statistics

pub mod stats;
mod url_list;

pub use stats::{print_statistics, RunStats};
pub use url_list::UrlListWriter;

use crate::catalog::CatalogItem;
use crate::crawler::BatchScheduler;

/// Destination for flushed batches, fixed for the whole run
pub enum OutputSink {
    /// Download images and metadata
    Download(BatchScheduler),
    /// Append image URLs to a file
    UrlList(UrlListWriter),
}

impl OutputSink {
    /// Processes and clears a batch
    ///
    /// The batch is emptied whether or not processing succeeds.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the output file cannot be written or the
    /// download directories cannot be created.
    pub async fn process(
        &mut self,
        batch: &mut Vec<CatalogItem>,
        stats: &mut RunStats,
    ) -> std::io::Result<()> {
        let items = std::mem::take(batch);
        if items.is_empty() {
            return Ok(());
        }

        tracing::debug!("Flushing {} items", items.len());

        match self {
            Self::Download(scheduler) => scheduler.flush(items, stats).await,
            Self::UrlList(writer) => {
                stats.urls_written += writer.write_batch(&items).await?;
                Ok(())
            }
        }
    }
}
