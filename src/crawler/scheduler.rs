//! Batch scheduler: runs fetch workers in fixed-size groups
//!
//! A flushed batch is split into groups of `group_size` items. Each group
//! is spawned onto a `JoinSet` and joined completely before the next group
//! starts, so at most `group_size` downloads are in flight at any time.

use crate::catalog::CatalogItem;
use crate::crawler::worker::FetchWorker;
use crate::output::RunStats;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Drives fetch workers over a batch of items
pub struct BatchScheduler {
    /// Worker shared by every task
    worker: Arc<FetchWorker>,

    /// Number of concurrent workers per group
    group_size: usize,
}

impl BatchScheduler {
    /// Creates a new scheduler
    ///
    /// A `group_size` of zero is treated as one.
    pub fn new(worker: FetchWorker, group_size: usize) -> Self {
        Self {
            worker: Arc::new(worker),
            group_size: group_size.max(1),
        }
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Downloads every item in the batch
    ///
    /// The download and metadata directories are created first. Per-item
    /// failures are counted in `stats` and never returned.
    ///
    /// # Errors
    ///
    /// Returns an error only if a target directory cannot be created.
    pub async fn flush(&self, items: Vec<CatalogItem>, stats: &mut RunStats) -> std::io::Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        tokio::fs::create_dir_all(self.worker.download_dir()).await?;
        tokio::fs::create_dir_all(self.worker.metadata_dir()).await?;

        let total = items.len();
        let mut pending = items.into_iter().peekable();
        let mut group_number = 0;

        while pending.peek().is_some() {
            group_number += 1;
            let mut group = JoinSet::new();

            for item in pending.by_ref().take(self.group_size) {
                let worker = Arc::clone(&self.worker);
                group.spawn(async move { worker.run(item).await });
            }

            tracing::debug!(
                "Running worker group {} ({} items, {} in batch)",
                group_number,
                group.len(),
                total
            );

            // Join barrier: the whole group finishes before the next starts
            while let Some(joined) = group.join_next().await {
                match joined {
                    Ok(outcome) => stats.record(&outcome),
                    Err(e) => {
                        tracing::error!("Fetch worker task failed: {}", e);
                        stats.failed += 1;
                    }
                }
            }

            stats.groups_run += 1;
        }

        Ok(())
    }
}
