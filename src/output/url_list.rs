//! URL list output: one resolved image URL per line

use crate::catalog::CatalogItem;
use crate::crawler::resolve;
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Appends image URLs to a file opened once for the whole run
pub struct UrlListWriter {
    writer: BufWriter<File>,
}

impl UrlListWriter {
    /// Opens `path` for appending, creating it if needed
    pub async fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;

        tracing::info!("Writing image URLs to {}", path.display());

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Writes the URL of every item and flushes the file
    ///
    /// Items without an image URL are logged and left out.
    ///
    /// # Returns
    ///
    /// The number of lines written
    pub async fn write_batch(&mut self, items: &[CatalogItem]) -> std::io::Result<u64> {
        let mut written = 0;

        for item in items {
            match resolve(item) {
                Some(url) => {
                    self.writer.write_all(url.as_bytes()).await?;
                    self.writer.write_all(b"\n").await?;
                    written += 1;
                }
                None => tracing::warn!("Image URL not found for photo {}", item.id),
            }
        }

        self.writer.flush().await?;
        Ok(written)
    }
}
