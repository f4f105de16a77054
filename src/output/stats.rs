//! Run statistics
//!
//! Counters are collected in memory by the crawl driver and the output sink
//! and printed once the run ends.

use crate::crawler::FetchOutcome;
use crate::HarvestError;
use chrono::{DateTime, Utc};

/// Counters for one run
#[derive(Debug, Clone)]
pub struct RunStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Catalog URLs crawled to the end
    pub urls_crawled: u64,

    /// Catalog URLs abandoned after a catalog error
    pub urls_failed: u64,

    /// Listing pages requested
    pub pages_requested: u64,

    /// Items returned by the catalog
    pub items_enumerated: u64,

    /// Image URLs appended to the output file
    pub urls_written: u64,

    /// Worker groups run by the batch scheduler
    pub groups_run: u64,

    pub downloaded: u64,
    pub bytes_downloaded: u64,
    pub already_present: u64,
    pub license_excluded: u64,
    pub unresolvable: u64,
    pub failed: u64,
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            urls_crawled: 0,
            urls_failed: 0,
            pages_requested: 0,
            items_enumerated: 0,
            urls_written: 0,
            groups_run: 0,
            downloaded: 0,
            bytes_downloaded: 0,
            already_present: 0,
            license_excluded: 0,
            unresolvable: 0,
            failed: 0,
        }
    }

    /// Counts one worker outcome
    pub fn record(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Downloaded { bytes } => {
                self.downloaded += 1;
                self.bytes_downloaded += bytes;
            }
            FetchOutcome::AlreadyPresent => self.already_present += 1,
            FetchOutcome::LicenseExcluded { .. } => self.license_excluded += 1,
            FetchOutcome::Unresolvable => self.unresolvable += 1,
            FetchOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Number of worker outcomes recorded
    pub fn items_processed(&self) -> u64 {
        self.downloaded + self.already_present + self.license_excluded + self.unresolvable + self.failed
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Fails if any catalog URL could not be crawled
    pub fn ensure_complete(&self) -> crate::Result<()> {
        if self.urls_failed == 0 {
            return Ok(());
        }
        Err(HarvestError::CrawlIncomplete {
            failed: self.urls_failed as usize,
            total: (self.urls_crawled + self.urls_failed) as usize,
        })
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RunStats) {
    println!("=== Harvest Statistics ===\n");

    println!("Crawl:");
    println!("  Catalog URLs crawled: {}", stats.urls_crawled);
    if stats.urls_failed > 0 {
        println!("  Catalog URLs failed: {}", stats.urls_failed);
    }
    println!("  Pages requested: {}", stats.pages_requested);
    println!("  Items enumerated: {}", stats.items_enumerated);
    println!();

    if stats.urls_written > 0 {
        println!("URL list:");
        println!("  URLs written: {}", stats.urls_written);
        println!();
    }

    let processed = stats.items_processed();
    if processed > 0 {
        println!("Downloads:");
        println!(
            "  Downloaded: {} ({:.1} MiB)",
            stats.downloaded,
            stats.bytes_downloaded as f64 / (1024.0 * 1024.0)
        );
        println!("  Already present: {}", stats.already_present);
        println!("  License excluded: {}", stats.license_excluded);
        println!("  No image URL: {}", stats.unresolvable);
        println!("  Failed: {}", stats.failed);
        println!("  Worker groups: {}", stats.groups_run);
        println!();

        let success_rate = (stats.downloaded + stats.already_present) as f64 / processed as f64 * 100.0;
        println!(
            "Success Rate: {:.1}% ({} / {} items saved or already present)",
            success_rate,
            stats.downloaded + stats.already_present,
            processed
        );
    }

    println!("Started: {}", stats.started_at.to_rfc3339());
    if let (Some(finished), Some(seconds)) = (stats.finished_at, stats.duration_seconds()) {
        println!("Finished: {} ({}s)", finished.to_rfc3339(), seconds);
    }
}
