//! End-to-end harvest tests
//!
//! The catalog is served from memory; images are served by wiremock and
//! written into temporary directories.

use crate::common::*;
use flickr_harvest::catalog::Container;
use flickr_harvest::crawler::run_with_catalog;
use flickr_harvest::{CatalogTarget, ConfigError, HarvestError, LicenseSet, UrlError};
use reqwest::Client;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SET_URL: &str = "https://www.flickr.com/photos/someone/sets/72157600000000000";
const STREAM_URL: &str = "https://www.flickr.com/photos/someone";
const GROUP_URL: &str = "https://www.flickr.com/groups/somegroup/pool";

fn set_target() -> (CatalogTarget, Container) {
    (
        CatalogTarget::Photoset {
            set_id: "72157600000000000".to_string(),
        },
        Container::Photoset {
            set_id: "S".to_string(),
        },
    )
}

fn stream_target() -> (CatalogTarget, Container) {
    (
        CatalogTarget::Photostream {
            user_url: "https://www.flickr.com/photos/someone/".to_string(),
        },
        Container::Photostream {
            user_id: "12345678@N00".to_string(),
        },
    )
}

async fn image_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpegdata".to_vec()))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_photoset_of_1200_items_takes_three_pages() {
    let dir = TempDir::new().unwrap();
    let list = dir.path().join("urls.txt");
    let (target, container) = set_target();

    let catalog = Arc::new(FakeCatalog::new().with_listing(
        target,
        container,
        photos("https://live.staticflickr.com", 1200, Some("4")),
    ));

    let settings = url_list_settings(dir.path(), &list, &[SET_URL]);
    let stats = run_with_catalog(&settings, catalog.clone(), Client::new())
        .await
        .unwrap();

    assert_eq!(
        catalog.page_requests(),
        vec![
            ("S".to_string(), 1, 500),
            ("S".to_string(), 2, 500),
            ("S".to_string(), 3, 500),
        ]
    );
    assert_eq!(stats.pages_requested, 3);
    assert_eq!(stats.items_enumerated, 1200);
    assert_eq!(stats.urls_written, 1200);

    let written = std::fs::read_to_string(&list).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 1200);
    assert_eq!(
        lines[0],
        "https://live.staticflickr.com/65535/1000_secret_o.jpg"
    );

    // Nothing is downloaded in URL list mode
    assert!(!dir.path().join("images").exists());
}

#[tokio::test]
async fn test_one_flush_per_page_in_download_mode() {
    let events = EventLog::default();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(RecordingImages {
            events: events.clone(),
        })
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (target, container) = stream_target();
    let catalog = Arc::new(
        FakeCatalog::new()
            .with_listing(target, container, photos(&server.uri(), 12, None))
            .with_event_log(events.clone()),
    );

    let mut settings = download_settings(dir.path(), &[STREAM_URL]);
    settings.page_size = 5;

    let stats = run_with_catalog(&settings, catalog.clone(), Client::new())
        .await
        .unwrap();

    // Pages of 5, 5 and 2 items, each flushed as a single group of workers
    assert_eq!(catalog.page_requests().len(), 3);
    assert_eq!(stats.groups_run, 3);
    assert_eq!(stats.downloaded, 12);
    assert_eq!(count_files(&dir.path().join("images")), 12);
    assert_eq!(count_files(&dir.path().join("meta")), 12);
    assert!(dir
        .path()
        .join("images/uploaded@1300000000-1000_secret_o.jpg")
        .exists());
    assert!(dir
        .path()
        .join("meta/1000_secret_o.jpg-meta.json")
        .exists());
    assert!(stats.ensure_complete().is_ok());

    // Every image of page N is downloaded before page N+1 is requested
    let expected_per_page = |page: u64| if page < 3 { 5 } else { 2 };
    let mut current_page = 0u64;
    let mut downloads_in_page = 0;
    for event in events.lock().unwrap().iter() {
        if let Some(page) = event.strip_prefix("page ") {
            let page: u64 = page.parse().unwrap();
            if current_page > 0 {
                assert_eq!(
                    downloads_in_page,
                    expected_per_page(current_page),
                    "page {} requested before page {} was flushed",
                    page,
                    current_page
                );
            }
            assert_eq!(page, current_page + 1);
            current_page = page;
            downloads_in_page = 0;
        } else {
            let name = event.rsplit('/').next().unwrap();
            let id: u64 = name.split('_').next().unwrap().parse().unwrap();
            assert_eq!((id - 1000) / 5 + 1, current_page, "unexpected {}", event);
            downloads_in_page += 1;
        }
    }
    assert_eq!(current_page, 3);
    assert_eq!(downloads_in_page, expected_per_page(3));
}

#[tokio::test]
async fn test_second_run_skips_complete_files() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-length", "8"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpegdata".to_vec()))
        .expect(3)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (target, container) = stream_target();
    let catalog = Arc::new(FakeCatalog::new().with_listing(
        target,
        container,
        photos(&server.uri(), 3, None),
    ));
    let settings = download_settings(dir.path(), &[STREAM_URL]);

    let first = run_with_catalog(&settings, catalog.clone(), Client::new())
        .await
        .unwrap();
    assert_eq!(first.downloaded, 3);

    let second = run_with_catalog(&settings, catalog.clone(), Client::new())
        .await
        .unwrap();
    assert_eq!(second.downloaded, 0);
    assert_eq!(second.already_present, 3);
}

#[tokio::test]
async fn test_empty_listing_requests_no_pages() {
    let dir = TempDir::new().unwrap();
    let (target, container) = set_target();
    let catalog = Arc::new(FakeCatalog::new().with_listing(target, container, Vec::new()));

    let settings = download_settings(dir.path(), &[SET_URL]);
    let stats = run_with_catalog(&settings, catalog.clone(), Client::new())
        .await
        .unwrap();

    assert!(catalog.page_requests().is_empty());
    assert_eq!(stats.pages_requested, 0);
    assert_eq!(stats.urls_crawled, 1);
}

#[tokio::test]
async fn test_exactly_one_and_just_over_one_page() {
    for (count, expected_pages) in [(500, 1), (501, 2)] {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("urls.txt");
        let (target, container) = set_target();
        let catalog = Arc::new(FakeCatalog::new().with_listing(
            target,
            container,
            photos("https://live.staticflickr.com", count, None),
        ));

        let settings = url_list_settings(dir.path(), &list, &[SET_URL]);
        run_with_catalog(&settings, catalog.clone(), Client::new())
            .await
            .unwrap();

        assert_eq!(catalog.page_requests().len(), expected_pages);
    }
}

#[tokio::test]
async fn test_license_filter_include_minus_exclude() {
    let server = image_server().await;
    let dir = TempDir::new().unwrap();
    let (target, container) = stream_target();

    let items = vec![
        photo(&server.uri(), "1", Some("1")),
        photo(&server.uri(), "2", Some("2")),
        photo(&server.uri(), "3", None),
        photo(&server.uri(), "4", Some("4")),
    ];
    let catalog = Arc::new(FakeCatalog::new().with_listing(target, container, items));

    let mut settings = download_settings(dir.path(), &[STREAM_URL]);
    settings.include = Some(LicenseSet::parse_list("1,2"));
    settings.exclude = LicenseSet::parse_list("2");

    let stats = run_with_catalog(&settings, catalog, Client::new())
        .await
        .unwrap();

    // License 1 and the unlicensed item pass; 2 is excluded, 4 not included
    assert_eq!(stats.downloaded, 2);
    assert_eq!(stats.license_excluded, 2);
    let images = dir.path().join("images");
    assert!(images.join("uploaded@1300000000-1_secret_o.jpg").exists());
    assert!(images.join("uploaded@1300000000-3_secret_o.jpg").exists());
    assert!(!images.join("uploaded@1300000000-2_secret_o.jpg").exists());
    assert!(!dir.path().join("meta/2_secret_o.jpg-meta.json").exists());
}

#[tokio::test]
async fn test_unknown_license_is_fatal_before_crawl() {
    let dir = TempDir::new().unwrap();
    let (target, container) = stream_target();
    let catalog = Arc::new(FakeCatalog::new().with_listing(target, container, Vec::new()));

    let mut settings = download_settings(dir.path(), &[STREAM_URL]);
    settings.exclude = LicenseSet::parse_list("42");

    let result = run_with_catalog(&settings, catalog.clone(), Client::new()).await;

    assert!(matches!(
        result,
        Err(HarvestError::Config(ConfigError::UnknownLicense { .. }))
    ));
    assert_eq!(catalog.lookup_count(), 0);
}

#[tokio::test]
async fn test_empty_license_set_is_fatal() {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(FakeCatalog::new());

    let mut settings = download_settings(dir.path(), &[STREAM_URL]);
    settings.include = Some(LicenseSet::parse_list("1"));
    settings.exclude = LicenseSet::parse_list("1");

    let result = run_with_catalog(&settings, catalog, Client::new()).await;
    assert!(matches!(
        result,
        Err(HarvestError::Config(ConfigError::EmptyLicenseSet))
    ));
}

#[tokio::test]
async fn test_license_table_failure_uses_built_in_table() {
    let server = image_server().await;
    let dir = TempDir::new().unwrap();
    let (target, container) = stream_target();
    let mut catalog = FakeCatalog::new().with_listing(
        target,
        container,
        vec![
            photo(&server.uri(), "1", Some("0")),
            photo(&server.uri(), "2", Some("4")),
        ],
    );
    catalog.fail_license_table = true;

    let mut settings = download_settings(dir.path(), &[STREAM_URL]);
    settings.exclude = LicenseSet::parse_list("0");

    let stats = run_with_catalog(&settings, Arc::new(catalog), Client::new())
        .await
        .unwrap();
    assert_eq!(stats.license_excluded, 1);
    assert_eq!(stats.downloaded, 1);
}

#[tokio::test]
async fn test_rejected_credentials_stop_before_crawl() {
    let dir = TempDir::new().unwrap();
    let (target, container) = stream_target();
    let mut catalog = FakeCatalog::new().with_listing(target, container, Vec::new());
    catalog.reject_credentials = true;
    let catalog = Arc::new(catalog);

    let settings = download_settings(dir.path(), &[STREAM_URL]);
    let result = run_with_catalog(&settings, catalog.clone(), Client::new()).await;

    assert!(matches!(result, Err(HarvestError::Authentication(_))));
    assert_eq!(catalog.lookup_count(), 0);
}

#[tokio::test]
async fn test_unrecognized_url_is_fatal_before_any_crawl() {
    let dir = TempDir::new().unwrap();
    let (target, container) = stream_target();
    let catalog = Arc::new(FakeCatalog::new().with_listing(target, container, Vec::new()));

    let settings = download_settings(
        dir.path(),
        &[STREAM_URL, "https://www.flickr.com/explore/interesting"],
    );
    let result = run_with_catalog(&settings, catalog.clone(), Client::new()).await;

    assert!(matches!(
        result,
        Err(HarvestError::UrlError(UrlError::Unrecognized(_)))
    ));
    // The valid URL before it was not crawled either
    assert_eq!(catalog.lookup_count(), 0);
}

#[tokio::test]
async fn test_catalog_error_on_one_url_continues_with_the_next() {
    let dir = TempDir::new().unwrap();
    let list = dir.path().join("urls.txt");
    let (target, container) = stream_target();
    // The group is unknown to the catalog
    let catalog = Arc::new(FakeCatalog::new().with_listing(
        target,
        container,
        photos("https://live.staticflickr.com", 2, None),
    ));

    let settings = url_list_settings(dir.path(), &list, &[GROUP_URL, STREAM_URL]);
    let stats = run_with_catalog(&settings, catalog.clone(), Client::new())
        .await
        .unwrap();

    assert_eq!(stats.urls_failed, 1);
    assert_eq!(stats.urls_crawled, 1);
    assert_eq!(stats.urls_written, 2);
    assert!(matches!(
        stats.ensure_complete(),
        Err(HarvestError::CrawlIncomplete { failed: 1, total: 2 })
    ));
}

#[tokio::test]
async fn test_single_photo_url() {
    let server = image_server().await;
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(FakeCatalog::new().with_item(photo(&server.uri(), "777", Some("4"))));

    let settings = download_settings(dir.path(), &["https://www.flickr.com/photos/someone/777/"]);
    let stats = run_with_catalog(&settings, catalog.clone(), Client::new())
        .await
        .unwrap();

    assert_eq!(stats.items_enumerated, 1);
    assert_eq!(stats.downloaded, 1);
    assert_eq!(catalog.lookup_count(), 0);
    assert!(dir
        .path()
        .join("images/uploaded@1300000000-777_secret_o.jpg")
        .exists());
}

#[tokio::test]
async fn test_failing_image_does_not_stop_the_crawl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/65535/1000_secret_o.jpg"))
        .respond_with(ResponseTemplate::new(500))
        .expect(4)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpegdata".to_vec()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (target, container) = stream_target();
    let catalog = Arc::new(FakeCatalog::new().with_listing(
        target,
        container,
        photos(&server.uri(), 10, None),
    ));

    let settings = download_settings(dir.path(), &[STREAM_URL]);
    let stats = run_with_catalog(&settings, catalog, Client::new())
        .await
        .unwrap();

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.downloaded, 9);
    assert_eq!(stats.groups_run, 2);
    assert!(!dir
        .path()
        .join("images/uploaded@1300000000-1000_secret_o.jpg")
        .exists());
    // A failed image is not a failed URL
    assert!(stats.ensure_complete().is_ok());
}
