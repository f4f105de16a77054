//! In-memory catalog and settings helpers shared by the integration tests

use async_trait::async_trait;
use flickr_harvest::catalog::{Container, License};
use flickr_harvest::config::{OutputMode, RunSettings, UserAgentConfig};
use flickr_harvest::{Catalog, CatalogError, CatalogItem, CatalogTarget, LicenseSet};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use wiremock::{Request, Respond, ResponseTemplate};

/// One page request seen by the fake catalog: (container id, page, per page)
pub type PageRequest = (String, u64, u32);

/// Ordered record of page requests and image downloads across components
pub type EventLog = Arc<Mutex<Vec<String>>>;

/// Serves image bytes and records `get <path>` for every request
pub struct RecordingImages {
    pub events: EventLog,
}

impl Respond for RecordingImages {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.events
            .lock()
            .unwrap()
            .push(format!("get {}", request.url.path()));
        ResponseTemplate::new(200).set_body_bytes(b"jpegdata".to_vec())
    }
}

/// A catalog served from memory that records what it was asked
#[derive(Default)]
pub struct FakeCatalog {
    pub reject_credentials: bool,
    pub fail_license_table: bool,
    listings: HashMap<CatalogTarget, (Container, Vec<CatalogItem>)>,
    items: HashMap<String, CatalogItem>,
    pub page_requests: Mutex<Vec<PageRequest>>,
    pub lookups: Mutex<u32>,
    events: Option<EventLog>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(
        mut self,
        target: CatalogTarget,
        container: Container,
        items: Vec<CatalogItem>,
    ) -> Self {
        self.listings.insert(target, (container, items));
        self
    }

    /// Records `page <n>` in `events` for every page request
    pub fn with_event_log(mut self, events: EventLog) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_item(mut self, item: CatalogItem) -> Self {
        self.items.insert(item.id.clone(), item);
        self
    }

    pub fn page_requests(&self) -> Vec<PageRequest> {
        self.page_requests.lock().unwrap().clone()
    }

    pub fn lookup_count(&self) -> u32 {
        *self.lookups.lock().unwrap()
    }

    fn listing(&self, container: &Container) -> Option<&Vec<CatalogItem>> {
        self.listings
            .values()
            .find(|(c, _)| c == container)
            .map(|(_, items)| items)
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn verify_credentials(&self) -> Result<(), CatalogError> {
        if self.reject_credentials {
            return Err(CatalogError::Api {
                method: "flickr.test.echo".to_string(),
                code: 100,
                message: "Invalid API Key (Key has invalid format)".to_string(),
            });
        }
        Ok(())
    }

    async fn lookup_container(&self, target: &CatalogTarget) -> Result<Container, CatalogError> {
        *self.lookups.lock().unwrap() += 1;
        self.listings
            .get(target)
            .map(|(container, _)| container.clone())
            .ok_or_else(|| CatalogError::NotFound(target.to_string()))
    }

    async fn item_count(&self, container: &Container) -> Result<u64, CatalogError> {
        self.listing(container)
            .map(|items| items.len() as u64)
            .ok_or_else(|| CatalogError::NotFound(container.to_string()))
    }

    async fn get_page(
        &self,
        container: &Container,
        page: u64,
        per_page: u32,
        _extras: &str,
    ) -> Result<Vec<CatalogItem>, CatalogError> {
        self.page_requests
            .lock()
            .unwrap()
            .push((container.id().to_string(), page, per_page));
        if let Some(events) = &self.events {
            events.lock().unwrap().push(format!("page {}", page));
        }

        let items = self
            .listing(container)
            .ok_or_else(|| CatalogError::NotFound(container.to_string()))?;
        let start = ((page - 1) * per_page as u64) as usize;
        Ok(items
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn get_item(&self, item_id: &str) -> Result<CatalogItem, CatalogError> {
        self.items
            .get(item_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("photo {}", item_id)))
    }

    async fn license_table(&self) -> Result<Vec<License>, CatalogError> {
        if self.fail_license_table {
            return Err(CatalogError::NotFound("license table".to_string()));
        }
        Ok((0..=10)
            .map(|id| License {
                id: id.to_string(),
                name: format!("License {}", id),
                url: String::new(),
            })
            .collect())
    }
}

/// Items whose original image is served by `image_host`
pub fn photos(image_host: &str, count: usize, license: Option<&str>) -> Vec<CatalogItem> {
    (0..count)
        .map(|i| photo(image_host, &format!("{}", 1000 + i), license))
        .collect()
}

pub fn photo(image_host: &str, id: &str, license: Option<&str>) -> CatalogItem {
    CatalogItem {
        url_o: Some(format!("{}/65535/{}_secret_o.jpg", image_host, id)),
        dateupload: Some("1300000000".to_string()),
        license: license.map(str::to_string),
        ..CatalogItem::with_id(id)
    }
}

/// Download-mode settings writing under `dir`
pub fn download_settings(dir: &Path, urls: &[&str]) -> RunSettings {
    RunSettings {
        urls: urls.iter().map(|u| u.to_string()).collect(),
        output: OutputMode::Download,
        download_dir: dir.join("images"),
        metadata_dir: dir.join("meta"),
        concurrency: 8,
        max_retries: 3,
        page_size: 500,
        include: None,
        exclude: LicenseSet::new(),
        api_key: "test-key".to_string(),
        endpoint: "https://api.flickr.com/services/rest/".to_string(),
        user_agent: UserAgentConfig::default(),
    }
}

/// URL-list-mode settings appending to `file`
pub fn url_list_settings(dir: &Path, file: &Path, urls: &[&str]) -> RunSettings {
    RunSettings {
        output: OutputMode::UrlList(file.to_path_buf()),
        ..download_settings(dir, urls)
    }
}

pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
