//! Flickr REST adapter
//!
//! Calls the public REST endpoint with an API key and decodes the JSON
//! responses into catalog types. Requests are unsigned, so only listings
//! visible to anonymous callers can be enumerated.

use crate::catalog::types::{lenient_required, lenient_string, lenient_u64, Content};
use crate::catalog::{Catalog, CatalogItem, Container, License};
use crate::url::CatalogTarget;
use crate::{CatalogError, CatalogResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

/// Default REST endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.flickr.com/services/rest/";

/// Catalog backed by the Flickr REST API
#[derive(Debug, Clone)]
pub struct FlickrCatalog {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl FlickrCatalog {
    /// Creates a new adapter
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `endpoint` - REST endpoint URL
    /// * `api_key` - Flickr API key
    pub fn new(
        client: Client,
        endpoint: &str,
        api_key: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
            api_key: api_key.into(),
        })
    }

    /// Calls one REST method and decodes its payload
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> CatalogResult<T> {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("method", method)
                .append_pair("api_key", &self.api_key)
                .append_pair("format", "json")
                .append_pair("nojsoncallback", "1");
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }

        tracing::debug!("Calling {} {:?}", method, params);

        // The request URL carries the API key, keep it out of error messages
        let http = |e: reqwest::Error| CatalogError::Http {
            method: method.to_string(),
            source: e.without_url(),
        };

        let body = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http)?
            .bytes()
            .await
            .map_err(http)?;

        let decode = |e: serde_json::Error| CatalogError::Decode {
            method: method.to_string(),
            source: e,
        };

        let envelope: Envelope = serde_json::from_slice(&body).map_err(decode)?;
        if envelope.stat != "ok" {
            return Err(CatalogError::Api {
                method: method.to_string(),
                code: envelope.code,
                message: envelope.message,
            });
        }

        serde_json::from_slice(&body).map_err(decode)
    }
}

#[async_trait]
impl Catalog for FlickrCatalog {
    async fn verify_credentials(&self) -> CatalogResult<()> {
        let _: Envelope = self.call("flickr.test.echo", &[]).await?;
        Ok(())
    }

    async fn lookup_container(&self, target: &CatalogTarget) -> CatalogResult<Container> {
        match target {
            CatalogTarget::Photostream { user_url } => {
                let found: UserLookup = self
                    .call("flickr.urls.lookupUser", &[("url", user_url.as_str())])
                    .await?;
                Ok(Container::Photostream {
                    user_id: found.user.id,
                })
            }
            CatalogTarget::Favorites { user_url } => {
                let found: UserLookup = self
                    .call("flickr.urls.lookupUser", &[("url", user_url.as_str())])
                    .await?;
                Ok(Container::Favorites {
                    user_id: found.user.id,
                })
            }
            CatalogTarget::Photoset { set_id } => {
                let info: PhotosetInfoResponse = self
                    .call("flickr.photosets.getInfo", &[("photoset_id", set_id.as_str())])
                    .await?;
                Ok(Container::Photoset {
                    set_id: info.photoset.id,
                })
            }
            CatalogTarget::GroupPool { group_url } => {
                let found: GroupLookup = self
                    .call("flickr.urls.lookupGroup", &[("url", group_url.as_str())])
                    .await?;
                Ok(Container::GroupPool {
                    group_id: found.group.id,
                })
            }
            CatalogTarget::Photo { photo_id } => {
                Err(CatalogError::NotFound(format!("container for photo {}", photo_id)))
            }
        }
    }

    async fn item_count(&self, container: &Container) -> CatalogResult<u64> {
        match container {
            Container::Photostream { user_id } => {
                let info: PersonResponse = self
                    .call("flickr.people.getInfo", &[("user_id", user_id.as_str())])
                    .await?;
                Ok(info.person.photos.count.content)
            }
            Container::Favorites { user_id } => {
                let list: PhotoTotalResponse = self
                    .call(
                        "flickr.favorites.getPublicList",
                        &[("user_id", user_id.as_str()), ("per_page", "1"), ("page", "1")],
                    )
                    .await?;
                Ok(list.photos.total)
            }
            Container::Photoset { set_id } => {
                let info: PhotosetInfoResponse = self
                    .call("flickr.photosets.getInfo", &[("photoset_id", set_id.as_str())])
                    .await?;
                Ok(info.photoset.photos)
            }
            Container::GroupPool { group_id } => {
                let info: GroupInfoResponse = self
                    .call("flickr.groups.getInfo", &[("group_id", group_id.as_str())])
                    .await?;
                Ok(info.group.pool_count.content)
            }
        }
    }

    async fn get_page(
        &self,
        container: &Container,
        page: u64,
        per_page: u32,
        extras: &str,
    ) -> CatalogResult<Vec<CatalogItem>> {
        let page = page.to_string();
        let per_page = per_page.to_string();
        let paging = [
            ("extras", extras),
            ("page", page.as_str()),
            ("per_page", per_page.as_str()),
        ];

        let photos = match container {
            Container::Photostream { user_id } => {
                let mut params = vec![("user_id", user_id.as_str()), ("safe_search", "3")];
                params.extend_from_slice(&paging);
                let listing: PhotosResponse = self.call("flickr.people.getPhotos", &params).await?;
                listing.photos.photo
            }
            Container::Favorites { user_id } => {
                let mut params = vec![("user_id", user_id.as_str())];
                params.extend_from_slice(&paging);
                let listing: PhotosResponse =
                    self.call("flickr.favorites.getPublicList", &params).await?;
                listing.photos.photo
            }
            Container::Photoset { set_id } => {
                let mut params = vec![("photoset_id", set_id.as_str())];
                params.extend_from_slice(&paging);
                let listing: PhotosetPhotosResponse =
                    self.call("flickr.photosets.getPhotos", &params).await?;
                listing.photoset.photo
            }
            Container::GroupPool { group_id } => {
                let mut params = vec![("group_id", group_id.as_str())];
                params.extend_from_slice(&paging);
                let listing: PhotosResponse =
                    self.call("flickr.groups.pools.getPhotos", &params).await?;
                listing.photos.photo
            }
        };

        Ok(photos)
    }

    async fn get_item(&self, item_id: &str) -> CatalogResult<CatalogItem> {
        let info: PhotoInfoResponse = self
            .call("flickr.photos.getInfo", &[("photo_id", item_id)])
            .await?;
        Ok(info.photo.into())
    }

    async fn license_table(&self) -> CatalogResult<Vec<License>> {
        let table: LicensesResponse = self.call("flickr.photos.licenses.getInfo", &[]).await?;
        Ok(table.licenses.license)
    }
}

// ===== Response shapes =====

#[derive(Debug, Deserialize)]
struct Envelope {
    stat: String,
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct IdRecord {
    #[serde(deserialize_with = "lenient_required")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct UserLookup {
    user: IdRecord,
}

#[derive(Debug, Deserialize)]
struct GroupLookup {
    group: IdRecord,
}

#[derive(Debug, Deserialize)]
struct CountContent {
    #[serde(rename = "_content", deserialize_with = "lenient_u64")]
    content: u64,
}

#[derive(Debug, Deserialize)]
struct PersonResponse {
    person: Person,
}

#[derive(Debug, Deserialize)]
struct Person {
    photos: PersonPhotos,
}

#[derive(Debug, Deserialize)]
struct PersonPhotos {
    count: CountContent,
}

#[derive(Debug, Deserialize)]
struct GroupInfoResponse {
    group: GroupInfo,
}

#[derive(Debug, Deserialize)]
struct GroupInfo {
    pool_count: CountContent,
}

#[derive(Debug, Deserialize)]
struct PhotosetInfoResponse {
    photoset: PhotosetInfo,
}

#[derive(Debug, Deserialize)]
struct PhotosetInfo {
    #[serde(deserialize_with = "lenient_required")]
    id: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    photos: u64,
}

#[derive(Debug, Deserialize)]
struct PhotoTotalResponse {
    photos: PhotoTotal,
}

#[derive(Debug, Deserialize)]
struct PhotoTotal {
    #[serde(default, deserialize_with = "lenient_u64")]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct PhotoPage {
    #[serde(default)]
    photo: Vec<CatalogItem>,
}

#[derive(Debug, Deserialize)]
struct PhotosResponse {
    photos: PhotoPage,
}

#[derive(Debug, Deserialize)]
struct PhotosetPhotosResponse {
    photoset: PhotoPage,
}

#[derive(Debug, Deserialize)]
struct LicensesResponse {
    licenses: LicenseList,
}

#[derive(Debug, Deserialize)]
struct LicenseList {
    #[serde(default)]
    license: Vec<License>,
}

#[derive(Debug, Deserialize)]
struct PhotoInfoResponse {
    photo: PhotoInfo,
}

/// `flickr.photos.getInfo` record, which nests what listings flatten
#[derive(Debug, Deserialize)]
struct PhotoInfo {
    #[serde(deserialize_with = "lenient_required")]
    id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    secret: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    server: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    farm: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    originalsecret: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    originalformat: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    license: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    dateuploaded: Option<String>,
    #[serde(default)]
    title: Option<Content<String>>,
    #[serde(default)]
    owner: Option<PhotoOwner>,
    #[serde(default)]
    dates: Option<PhotoDates>,
    #[serde(default)]
    tags: Option<PhotoTags>,
}

#[derive(Debug, Deserialize)]
struct PhotoOwner {
    #[serde(default)]
    nsid: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoDates {
    #[serde(default)]
    taken: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoTags {
    #[serde(default)]
    tag: Vec<Content<String>>,
}

impl From<PhotoInfo> for CatalogItem {
    fn from(info: PhotoInfo) -> Self {
        let (owner, ownername) = match info.owner {
            Some(o) => (o.nsid, o.username),
            None => (None, None),
        };
        let tags = info
            .tags
            .map(|t| {
                t.tag
                    .into_iter()
                    .map(|c| c.content)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|t| !t.is_empty());

        CatalogItem {
            id: info.id,
            owner,
            ownername,
            title: info.title.map(|t| t.content).filter(|t| !t.is_empty()),
            tags,
            secret: info.secret,
            server: info.server,
            farm: info.farm,
            originalsecret: info.originalsecret,
            originalformat: info.originalformat,
            license: info.license,
            dateupload: info.dateuploaded,
            datetaken: info.dates.and_then(|d| d.taken),
            ..CatalogItem::default()
        }
    }
}
