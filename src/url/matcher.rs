use url::Url;

/// Host pattern every catalog URL must match
pub const FLICKR_HOST_PATTERN: &str = "*.flickr.com";

/// Checks if a host matches a wildcard pattern
///
/// This function supports two types of patterns:
/// 1. Exact match: "flickr.com" matches only "flickr.com"
/// 2. Wildcard match: "*.flickr.com" matches:
///    - "flickr.com" (the bare domain)
///    - "www.flickr.com" (single subdomain)
///    - "a.b.flickr.com" (nested subdomains)
///
/// # Examples
///
/// ```
/// use flickr_harvest::url::matches_wildcard;
///
/// assert!(matches_wildcard("*.flickr.com", "flickr.com"));
/// assert!(matches_wildcard("*.flickr.com", "secure.flickr.com"));
/// assert!(!matches_wildcard("*.flickr.com", "notflickr.com"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}

/// Returns the lowercase host of a URL if it is a Flickr web host
pub fn flickr_host(url: &Url) -> Option<String> {
    url.host_str()
        .map(|h| h.to_lowercase())
        .filter(|h| matches_wildcard(FLICKR_HOST_PATTERN, h))
}
