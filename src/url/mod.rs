//! URL handling module for Flickr-Harvest
//!
//! This module normalizes the catalog URLs given on the command line and
//! classifies each one into the kind of listing it points at.

mod matcher;
mod normalize;

use crate::UrlError;
use std::fmt;

// Re-export main functions
pub use matcher::{flickr_host, matches_wildcard, FLICKR_HOST_PATTERN};
pub use normalize::{normalize_url, path_segments};

/// The listing a catalog URL points at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CatalogTarget {
    /// A single photo page
    Photo { photo_id: String },
    /// Every public photo of a user
    Photostream { user_url: String },
    /// One named photoset (album)
    Photoset { set_id: String },
    /// Photos a user marked as favorite
    Favorites { user_url: String },
    /// The photo pool of a group
    GroupPool { group_url: String },
}

impl CatalogTarget {
    /// Short name of the listing kind, used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Photo { .. } => "photo",
            Self::Photostream { .. } => "photostream",
            Self::Photoset { .. } => "photoset",
            Self::Favorites { .. } => "favorites",
            Self::GroupPool { .. } => "group pool",
        }
    }
}

impl fmt::Display for CatalogTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Photo { photo_id } => write!(f, "photo {}", photo_id),
            Self::Photostream { user_url } => write!(f, "photostream {}", user_url),
            Self::Photoset { set_id } => write!(f, "photoset {}", set_id),
            Self::Favorites { user_url } => write!(f, "favorites of {}", user_url),
            Self::GroupPool { group_url } => write!(f, "group pool {}", group_url),
        }
    }
}

/// Classifies a catalog URL by the shape of its path
///
/// Supported shapes (any Flickr host, trailing slash optional):
///
/// | Path | Target |
/// |------|--------|
/// | `/photos/{user}` | Photostream |
/// | `/photos/{user}/{photo-id}` | Photo |
/// | `/photos/{user}/sets/{set-id}` | Photoset |
/// | `/photos/{user}/albums/{set-id}` | Photoset |
/// | `/photos/{user}/sets/{set-id}/with/{photo-id}` | Photo |
/// | `/photos/{user}/favorites` | Favorites |
/// | `/groups/{group}` | GroupPool |
/// | `/groups/{group}/pool` | GroupPool |
///
/// # Examples
///
/// ```
/// use flickr_harvest::url::{classify_url, CatalogTarget};
///
/// let target = classify_url("https://www.flickr.com/photos/someone/sets/72157600000000000").unwrap();
/// assert_eq!(target, CatalogTarget::Photoset { set_id: "72157600000000000".to_string() });
/// ```
pub fn classify_url(url_str: &str) -> Result<CatalogTarget, UrlError> {
    let url = normalize_url(url_str)?;

    if flickr_host(&url).is_none() {
        return Err(UrlError::UnsupportedHost(url.to_string()));
    }

    let unrecognized = || UrlError::Unrecognized(url.to_string());
    let segments = path_segments(&url);

    let target = match segments.as_slice() {
        ["photos", user] if is_name(user) => CatalogTarget::Photostream {
            user_url: user_url(user),
        },
        ["photos", user, "favorites"] if is_name(user) => CatalogTarget::Favorites {
            user_url: user_url(user),
        },
        ["photos", user, "sets" | "albums", set_id] if is_name(user) && is_id(set_id) => {
            CatalogTarget::Photoset {
                set_id: set_id.to_string(),
            }
        }
        ["photos", user, "sets" | "albums", set_id, "with", photo_id]
            if is_name(user) && is_id(set_id) && is_id(photo_id) =>
        {
            CatalogTarget::Photo {
                photo_id: photo_id.to_string(),
            }
        }
        ["photos", user, photo_id] if is_name(user) && is_id(photo_id) => CatalogTarget::Photo {
            photo_id: photo_id.to_string(),
        },
        ["groups", group] | ["groups", group, "pool"] if is_name(group) => {
            CatalogTarget::GroupPool {
                group_url: format!("https://www.flickr.com/groups/{}/", group),
            }
        }
        _ => return Err(unrecognized()),
    };

    Ok(target)
}

/// Classifies every URL, failing on the first one that is not supported
pub fn classify_all<S: AsRef<str>>(urls: &[S]) -> Result<Vec<(String, CatalogTarget)>, UrlError> {
    urls.iter()
        .map(|u| {
            let raw = u.as_ref().trim().to_string();
            classify_url(&raw).map(|target| (raw, target))
        })
        .collect()
}

fn user_url(user: &str) -> String {
    format!("https://www.flickr.com/photos/{}/", user)
}

/// User and group path names: word characters, `@` and `-`
fn is_name(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '@' || c == '-')
}

fn is_id(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit())
}
