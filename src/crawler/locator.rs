//! Resource locator: picks the image URL to download for an item
//!
//! Candidates are tried in a fixed order of decreasing quality: the
//! original upload, then the large (1024px), medium 800 and medium 640
//! renditions. An explicit URL from the listing extras always wins over
//! one derived from the item's server, id and secret.

use crate::catalog::CatalogItem;

/// Suffix appended to the image base name for its metadata file
pub const METADATA_SUFFIX: &str = "-meta.json";

/// Host serving static photo files
const STATIC_HOST: &str = "https://live.staticflickr.com";

/// Image renditions in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendition {
    Original,
    Large,
    Medium800,
    Medium640,
}

impl Rendition {
    pub const RANKED: [Rendition; 4] = [
        Rendition::Original,
        Rendition::Large,
        Rendition::Medium800,
        Rendition::Medium640,
    ];

    /// Size suffix used in static photo file names
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Original => "o",
            Self::Large => "b",
            Self::Medium800 => "c",
            Self::Medium640 => "z",
        }
    }

    /// The URL of this rendition for an item, if it can be determined
    pub fn url_for(&self, item: &CatalogItem) -> Option<String> {
        match self {
            Self::Original => item.url_o.clone().or_else(|| derived_original_url(item)),
            Self::Large => item.url_l.clone().or_else(|| derived_url(item, self.suffix())),
            Self::Medium800 => item.url_c.clone().or_else(|| derived_url(item, self.suffix())),
            Self::Medium640 => item.url_z.clone().or_else(|| derived_url(item, self.suffix())),
        }
    }
}

/// Returns the best available image URL for an item
///
/// # Returns
///
/// * `Some(String)` - The first candidate present in quality order
/// * `None` - The item carries no usable URL
pub fn resolve(item: &CatalogItem) -> Option<String> {
    Rendition::RANKED.iter().find_map(|r| r.url_for(item))
}

/// `https://live.staticflickr.com/{server}/{id}_{secret}_{suffix}.jpg`
fn derived_url(item: &CatalogItem, suffix: &str) -> Option<String> {
    let server = item.server.as_deref()?;
    let secret = item.secret.as_deref()?;
    if item.id.is_empty() {
        return None;
    }
    Some(format!(
        "{}/{}/{}_{}_{}.jpg",
        STATIC_HOST, server, item.id, secret, suffix
    ))
}

/// Originals use their own secret and keep the uploaded format
fn derived_original_url(item: &CatalogItem) -> Option<String> {
    let server = item.server.as_deref()?;
    let secret = item.originalsecret.as_deref()?;
    let format = item.originalformat.as_deref()?;
    if item.id.is_empty() {
        return None;
    }
    Some(format!(
        "{}/{}/{}_{}_o.{}",
        STATIC_HOST, server, item.id, secret, format
    ))
}

/// Which timestamp names a downloaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Added to a favorites list at this time
    Favorited(String),
    /// Uploaded at this time
    Uploaded(String),
}

impl Provenance {
    /// Favorite time wins over upload time
    pub fn of(item: &CatalogItem) -> Option<Self> {
        item.date_faved
            .clone()
            .map(Self::Favorited)
            .or_else(|| item.dateupload.clone().map(Self::Uploaded))
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Favorited(_) => "faved",
            Self::Uploaded(_) => "uploaded",
        }
    }

    pub fn timestamp(&self) -> &str {
        match self {
            Self::Favorited(ts) | Self::Uploaded(ts) => ts,
        }
    }
}

/// Where one item is downloaded from and saved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Image URL
    pub url: String,
    /// Image file name, `<provenance>@<timestamp>-<basename>`
    pub file_name: String,
    /// Metadata file name, `<basename>-meta.json`
    pub metadata_file_name: String,
}

impl ResolvedTarget {
    /// Resolves an item's URL and local file names
    ///
    /// Returns `None` if no URL can be found or the URL has no file name.
    pub fn from_item(item: &CatalogItem) -> Option<Self> {
        let url = resolve(item)?;
        let base = base_name(&url)?;

        let file_name = match Provenance::of(item) {
            Some(p) => format!("{}@{}-{}", p.tag(), p.timestamp(), base),
            None => base.clone(),
        };

        Some(Self {
            metadata_file_name: format!("{}{}", base, METADATA_SUFFIX),
            file_name,
            url,
        })
    }
}

/// The last path segment of a URL, without query string or fragment
///
/// # Examples
///
/// ```
/// use flickr_harvest::crawler::base_name;
///
/// assert_eq!(
///     base_name("https://live.staticflickr.com/65535/123_abc_o.jpg?s=1"),
///     Some("123_abc_o.jpg".to_string())
/// );
/// assert_eq!(base_name("https://live.staticflickr.com/"), None);
/// ```
pub fn base_name(url: &str) -> Option<String> {
    let path = url.split(&['?', '#'][..]).next().unwrap_or_default();
    let without_scheme = path.split_once("://").map_or(path, |(_, rest)| rest);
    let (_, tail) = without_scheme.split_once('/')?;
    tail.rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
}
