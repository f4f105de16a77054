use crate::UrlError;
use url::Url;

/// Normalizes a catalog URL as typed by the user or read from an input file
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace (including `\r` from CRLF input files)
/// 2. Parse the URL; reject if malformed
/// 3. Accept only `http` and `https`
/// 4. Lowercase the host
/// 5. Normalize the path:
///    - Remove empty segments (multiple or trailing slashes)
///    - Empty path becomes /
/// 6. Remove fragment and query string
///
/// # Examples
///
/// ```
/// use flickr_harvest::url::normalize_url;
///
/// let url = normalize_url(" https://WWW.FLICKR.COM/photos/someone/ \r\n").unwrap();
/// assert_eq!(url.as_str(), "https://www.flickr.com/photos/someone");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let trimmed = url_str.trim();

    let mut url = Url::parse(trimmed).map_err(|e| UrlError::Parse(format!("{}: {}", trimmed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    // The url crate already lowercases registered host names on parse
    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);
    url.set_fragment(None);
    url.set_query(None);

    Ok(url)
}

/// Returns the non-empty path segments of a normalized URL
pub fn path_segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

/// Collapses empty segments and removes the trailing slash
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}
