//! Catalog module: the remote photo listing the crawler consumes
//!
//! The crawler only talks to the catalog through the [`Catalog`] trait, so the
//! Flickr REST adapter can be swapped for an in-memory catalog in tests.

mod flickr;
mod license;
mod types;

pub use flickr::{FlickrCatalog, DEFAULT_ENDPOINT};
pub use license::{fallback_license_table, LicensePolicy, LicenseSet};
pub use types::{CatalogItem, License};

use crate::url::CatalogTarget;
use crate::CatalogResult;
use async_trait::async_trait;
use std::fmt;

/// Extra attributes requested with every listing page
pub const PAGE_EXTRAS: &str =
    "url_o,url_l,url_c,url_z,date_upload,date_taken,owner_name,tags,license,original_format";

/// A resolved, paged listing in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    Photostream { user_id: String },
    Favorites { user_id: String },
    Photoset { set_id: String },
    GroupPool { group_id: String },
}

impl Container {
    /// The catalog id of the listing
    pub fn id(&self) -> &str {
        match self {
            Self::Photostream { user_id } | Self::Favorites { user_id } => user_id,
            Self::Photoset { set_id } => set_id,
            Self::GroupPool { group_id } => group_id,
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Photostream { user_id } => write!(f, "photostream of {}", user_id),
            Self::Favorites { user_id } => write!(f, "favorites of {}", user_id),
            Self::Photoset { set_id } => write!(f, "photoset {}", set_id),
            Self::GroupPool { group_id } => write!(f, "pool of group {}", group_id),
        }
    }
}

/// Operations the crawler needs from the remote catalog
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Checks that the configured credentials are accepted
    async fn verify_credentials(&self) -> CatalogResult<()>;

    /// Resolves a paged target to its catalog container id
    async fn lookup_container(&self, target: &CatalogTarget) -> CatalogResult<Container>;

    /// Total number of items in a container
    async fn item_count(&self, container: &Container) -> CatalogResult<u64>;

    /// Fetches one page (1-based) of a container's items
    async fn get_page(
        &self,
        container: &Container,
        page: u64,
        per_page: u32,
        extras: &str,
    ) -> CatalogResult<Vec<CatalogItem>>;

    /// Fetches the full record of one item
    async fn get_item(&self, item_id: &str) -> CatalogResult<CatalogItem>;

    /// The catalog's table of known licenses
    async fn license_table(&self) -> CatalogResult<Vec<License>>;
}

/// Loads the license table, falling back to the built-in table on failure
pub async fn load_license_table<C: Catalog + ?Sized>(catalog: &C) -> Vec<License> {
    match catalog.license_table().await {
        Ok(table) if !table.is_empty() => table,
        Ok(_) => {
            tracing::warn!("Catalog returned an empty license table, using built-in table");
            fallback_license_table()
        }
        Err(e) => {
            tracing::warn!("License lookup failed ({}), using built-in table", e);
            fallback_license_table()
        }
    }
}
