//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for image files, including:
//! - Building the HTTP clients with a proper user agent string
//! - HEAD requests to learn the remote file size
//! - GET requests streamed to a temporary file and renamed into place

use crate::config::UserAgentConfig;
use reqwest::header::CONTENT_LENGTH;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Errors downloading one file
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use flickr_harvest::config::UserAgentConfig;
/// use flickr_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    client_builder(config).gzip(true).brotli(true).build()
}

/// Builds the client used for image HEAD and GET requests
///
/// Content decoding is off, so HEAD lengths and stored files both count
/// the bytes exactly as the server sends them.
pub fn build_download_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    client_builder(config).gzip(false).brotli(false).build()
}

fn client_builder(config: &UserAgentConfig) -> reqwest::ClientBuilder {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(300))
        .connect_timeout(Duration::from_secs(10))
}

/// Sends a HEAD request and returns the reported Content-Length
///
/// # Returns
///
/// * `Ok(Some(u64))` - The server reported a length
/// * `Ok(None)` - No usable Content-Length header
/// * `Err(reqwest::Error)` - The request failed or returned an error status
pub async fn head_content_length(client: &Client, url: &str) -> Result<Option<u64>, reqwest::Error> {
    let response = client.head(url).send().await?.error_for_status()?;

    // Read the header itself: the body of a HEAD response is always empty
    Ok(response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok()))
}

/// Downloads a URL to `dest`
///
/// The body is streamed to `<dest>.part` and renamed over `dest` once
/// complete, so `dest` never holds a partial file. The temporary file is
/// removed on failure.
///
/// # Returns
///
/// * `Ok(u64)` - Number of bytes written
/// * `Err(FetchError)` - Network or filesystem failure
pub async fn download_to(client: &Client, url: &str, dest: &Path) -> Result<u64, FetchError> {
    let partial = partial_path(dest);

    match stream_to(client, url, &partial).await {
        Ok(written) => {
            tokio::fs::rename(&partial, dest).await?;
            Ok(written)
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&partial).await;
            Err(e)
        }
    }
}

async fn stream_to(client: &Client, url: &str, path: &Path) -> Result<u64, FetchError> {
    let mut response = client.get(url).send().await?.error_for_status()?;

    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    file.sync_all().await?;

    Ok(written)
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&UserAgentConfig::default()).is_ok());
        assert!(build_download_client(&UserAgentConfig::default()).is_ok());
    }

    fn download_client() -> Client {
        build_download_client(&UserAgentConfig::default()).unwrap()
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/tmp/a/photo.jpg")),
            PathBuf::from("/tmp/a/photo.jpg.part")
        );
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1/photo.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 2048]))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("photo.jpg");
        let client = Client::new();

        let written = download_to(&client, &format!("{}/1/photo.jpg", server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(written, 2048);
        assert_eq!(std::fs::read(&dest).unwrap(), vec![7u8; 2048]);
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_download_error_status_leaves_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("photo.jpg");

        let result = download_to(&Client::new(), &format!("{}/x.jpg", server.uri()), &dest).await;

        assert!(matches!(result, Err(FetchError::Http(_))));
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_head_content_length() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/x.jpg"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-length", "1234"))
            .mount(&server)
            .await;

        let length = head_content_length(&Client::new(), &format!("{}/x.jpg", server.uri()))
            .await
            .unwrap();
        assert_eq!(length, Some(1234));
    }

    #[tokio::test]
    async fn test_head_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(
            head_content_length(&Client::new(), &format!("{}/x.jpg", server.uri()))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_encoded_head_keeps_content_length() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/x.jpg"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-encoding", "gzip")
                    .insert_header("content-length", "5"),
            )
            .mount(&server)
            .await;

        let length = head_content_length(&download_client(), &format!("{}/x.jpg", server.uri()))
            .await
            .unwrap();
        assert_eq!(length, Some(5));
    }

    #[tokio::test]
    async fn test_encoded_body_is_stored_as_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-encoding", "gzip")
                    .set_body_bytes(b"raw-bytes".to_vec()),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("photo.jpg");

        let written = download_to(&download_client(), &format!("{}/x.jpg", server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(written, 9);
        assert_eq!(std::fs::read(&dest).unwrap(), b"raw-bytes");
    }
}
