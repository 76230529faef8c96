//! Cache, filtering and concurrency behavior of `NewsService`.

mod common;

use andes_news::filter::FilterRequest;
use andes_news::sites::SiteKind;
use andes_news::{Error, NewsRequest, NewsService};
use common::*;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param_is_missing};
use wiremock::{Mock, MockServer};

const ANDES: &[Entry] = &[
    entry("a1", "10 de maio de 2025"),
    entry("a2", "8 de maio de 2025"),
    entry("a3", "2 de maio de 2025"),
];

/// Listing page 0 that must be scraped exactly `times` times.
async fn mount_counted_listing(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path("/sites/noticias"))
        .and(query_param_is_missing("page"))
        .respond_with(html(&andes_listing(ANDES)))
        .expect(times)
        .mount(server)
        .await;
}

fn request(max_items: usize) -> NewsRequest {
    NewsRequest {
        max_items: Some(max_items),
        filter: FilterRequest::default(),
    }
}

#[tokio::test]
async fn second_request_is_served_from_cache() {
    let server = MockServer::start().await;
    mount_counted_listing(&server, 1).await;
    mount_andes_details(&server, ANDES).await;

    let config = config_for(&server.uri(), &[SiteKind::Andes]);
    let service = NewsService::from_config(&config).unwrap();

    let first = service.fetch(&request(3)).await.unwrap();
    assert!(!first.from_cache);
    assert_eq!(first.total, 3);

    let second = service.fetch(&request(3)).await.unwrap();
    assert!(second.from_cache);
    assert_eq!(second.items, first.items);
    assert_eq!(second.cached_at, first.cached_at);

    let stats = service.cache().stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.size, 1);
}

#[tokio::test]
async fn filtered_items_are_renumbered_densely() {
    let server = MockServer::start().await;
    mount_andes_listing(&server, ANDES).await;
    mount_andes_details(&server, ANDES).await;

    let config = config_for(&server.uri(), &[SiteKind::Andes]);
    let service = NewsService::from_config(&config).unwrap();

    let response = service
        .fetch(&NewsRequest {
            max_items: Some(3),
            filter: FilterRequest {
                include: vec!["A2".into(), "a3".into()],
                ..Default::default()
            },
        })
        .await
        .unwrap();

    let got: Vec<_> = response
        .items
        .iter()
        .map(|i| (i.number, i.title.as_str()))
        .collect();
    assert_eq!(
        got,
        vec![(1, "Título completo a2"), (2, "Título completo a3")]
    );
    assert_eq!(response.total, 2);
}

#[tokio::test]
async fn different_filters_are_cached_separately() {
    let server = MockServer::start().await;
    mount_counted_listing(&server, 2).await;
    mount_andes_details(&server, ANDES).await;

    let config = config_for(&server.uri(), &[SiteKind::Andes]);
    let service = NewsService::from_config(&config).unwrap();

    service.fetch(&request(3)).await.unwrap();
    let filtered = service
        .fetch(&NewsRequest {
            max_items: Some(3),
            filter: FilterRequest {
                exclude: vec!["a1".into()],
                ..Default::default()
            },
        })
        .await
        .unwrap();
    assert!(!filtered.from_cache);
    assert_eq!(filtered.total, 2);
    assert_eq!(service.cache().stats().size, 2);
}

#[tokio::test]
async fn concurrent_identical_requests_scrape_once() {
    let server = MockServer::start().await;
    mount_counted_listing(&server, 1).await;
    mount_andes_details(&server, ANDES).await;

    let mut config = config_for(&server.uri(), &[SiteKind::Andes]);
    config.cache.single_flight = true;
    let service = NewsService::from_config(&config).unwrap();

    let req = request(2);
    let (a, b) = tokio::join!(service.fetch(&req), service.fetch(&req));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.from_cache, b.from_cache);
    assert_eq!(a.items, b.items);
}

#[tokio::test]
async fn slow_sites_hit_the_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sites/noticias"))
        .respond_with(html(&andes_listing(ANDES)).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut config = config_for(&server.uri(), &[SiteKind::Andes]);
    config.aggregator.request_timeout_secs = 1;
    let service = NewsService::from_config(&config).unwrap();

    let result = service.fetch(&request(3)).await;
    assert!(matches!(result, Err(Error::Timeout { secs: 1 })));
    assert_eq!(service.cache().stats().size, 0);
}
