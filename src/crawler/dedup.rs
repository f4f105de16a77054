//! Skip detection for files that are already on disk
//!
//! An image is trusted only when a local file exists and its size equals
//! the Content-Length the server reports for the URL. This catches
//! interrupted downloads; it does not detect same-size corruption.
//! Metadata files are trusted on existence alone.

use crate::crawler::fetcher::head_content_length;
use reqwest::Client;
use std::path::Path;

/// Returns true if the image at `local_path` can be kept without fetching
///
/// Any HEAD failure, missing length or size mismatch means the file must be
/// downloaded again.
pub async fn should_skip(client: &Client, local_path: &Path, remote_url: &str) -> bool {
    let local_len = match local_file_len(local_path).await {
        Some(len) => len,
        None => return false,
    };

    match head_content_length(client, remote_url).await {
        Ok(remote_len) => {
            let matches = sizes_match(local_len, remote_len);
            if !matches {
                tracing::debug!(
                    "Size mismatch for {}: local {} bytes, remote {:?}",
                    local_path.display(),
                    local_len,
                    remote_len
                );
            }
            matches
        }
        Err(e) => {
            tracing::debug!("HEAD {} failed, will download: {}", remote_url, e);
            false
        }
    }
}

/// True only when the remote length is known and equal to the local length
pub fn sizes_match(local_len: u64, remote_len: Option<u64>) -> bool {
    remote_len == Some(local_len)
}

/// Size of a regular file, `None` if it is absent or not a file
async fn local_file_len(path: &Path) -> Option<u64> {
    tokio::fs::metadata(path)
        .await
        .ok()
        .filter(|m| m.is_file())
        .map(|m| m.len())
}

/// Returns true if a metadata file already exists
pub async fn metadata_present(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
