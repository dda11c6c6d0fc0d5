//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end: robots.txt, worker pool, dedup and termination.

use std::time::Duration;
use trawler::config::{CrawlOptions, CrawlerConfig, HealthConfig, RequestConfig};
use trawler::crawler::Crawler;
use trawler::extract::{ExtractionRule, FilterRule, ItemRule, UrlRule};
use trawler::{HealthError, TrawlerError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates crawl options with short timings suitable for tests
fn create_test_options(worker_count: usize, max_depth: i32) -> CrawlOptions {
    CrawlOptions {
        crawler: CrawlerConfig {
            worker_count,
            max_depth,
            crawl_delay_ms: 0,
            max_visited_urls: 1000,
            max_items_found: 1000,
            max_tasks: 100,
            allow_empty_item: true,
        },
        request: RequestConfig {
            header_key: "User-Agent".to_string(),
            header_value: "TestBot/1.0".to_string(),
            timeout_secs: 5,
        },
        health: HealthConfig {
            readiness_grace_ms: 20,
            liveness_interval_ms: 50,
            liveness_window_ms: 30_000,
        },
    }
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html")
        .set_body_string(format!("<html><body>{}</body></html>", body))
}

fn links(paths: &[&str]) -> String {
    paths
        .iter()
        .map(|p| format!(r#"<a href="{}">{}</a>"#, p, p))
        .collect()
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html_page(body))
        .mount(server)
        .await;
}

async fn mount_no_robots(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_crawl_counts_duplicates() {
    let server = MockServer::start().await;
    mount_no_robots(&server).await;
    mount_page(&server, "/", &links(&["/a", "/b"])).await;
    mount_page(&server, "/a", &links(&["/b", "/"])).await;
    mount_page(&server, "/b", &links(&["/a"])).await;

    let crawler = Crawler::new(create_test_options(2, 2)).unwrap();
    let root = format!("{}/", server.uri());
    let response = crawler.crawl(&root, vec![], vec![]).await.unwrap();

    assert_eq!(response.metrics.root_url, root);
    assert_eq!(response.metrics.urls_visited, 3);
    assert_eq!(response.metrics.urls_found, 5);
    assert_eq!(response.metrics.duplicate_urls_found, 3);
    assert_eq!(response.results.len(), 3);

    let mut visited: Vec<&str> = response
        .results
        .iter()
        .map(|r| r.source_url.as_str())
        .collect();
    visited.sort();
    let mut expected = vec![
        root.clone(),
        format!("{}/a", server.uri()),
        format!("{}/b", server.uri()),
    ];
    expected.sort();
    assert_eq!(visited, expected);
}

#[tokio::test]
async fn test_max_depth_zero_fetches_only_root() {
    let server = MockServer::start().await;
    mount_no_robots(&server).await;
    mount_page(&server, "/", &links(&["/a", "/b"])).await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_page("unreachable"))
        .expect(0)
        .mount(&server)
        .await;

    let crawler = Crawler::new(create_test_options(3, 0)).unwrap();
    let response = crawler
        .crawl(&format!("{}/", server.uri()), vec![], vec![])
        .await
        .unwrap();

    assert_eq!(response.metrics.urls_visited, 1);
    assert_eq!(response.metrics.urls_found, 2);
    assert_eq!(response.metrics.duplicate_urls_found, 0);
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].extracted_urls.len(), 2);
    assert!(response.results[0]
        .extracted_urls
        .iter()
        .all(|child| child.current_depth == 1 && child.max_depth == 0));
}

#[tokio::test]
async fn test_robots_txt_respect() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nDisallow: /private\n\nUser-agent: OtherBot\nDisallow: /public\n"),
        )
        .mount(&server)
        .await;

    mount_page(&server, "/", &links(&["/private/data", "/public"])).await;
    mount_page(&server, "/public", "no links here").await;

    Mock::given(method("GET"))
        .and(path("/private/data"))
        .respond_with(html_page("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let crawler = Crawler::new(create_test_options(2, 3)).unwrap();
    let response = crawler
        .crawl(&format!("{}/", server.uri()), vec![], vec![])
        .await
        .unwrap();

    assert_eq!(response.metrics.urls_visited, 2);
    assert!(response
        .results
        .iter()
        .flat_map(|r| r.extracted_urls.iter())
        .all(|child| !child.current_url.contains("/private")));
}

#[tokio::test]
async fn test_missing_robots_txt_allows_everything() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/", &links(&["/private/data"])).await;
    mount_page(&server, "/private/data", "ok").await;

    let crawler = Crawler::new(create_test_options(1, 1)).unwrap();
    let response = crawler
        .crawl(&format!("{}/", server.uri()), vec![], vec![])
        .await
        .unwrap();

    assert_eq!(response.metrics.urls_visited, 2);
}

#[tokio::test]
async fn test_item_extraction_across_pages() {
    let server = MockServer::start().await;
    mount_no_robots(&server).await;

    mount_page(
        &server,
        "/",
        r#"
        <div class="product"><span class="name">Widget</span><span class="price">$1,299.00</span></div>
        <div class="product"><span class="name">Gadget</span><span class="price">$15.50</span></div>
        <a title="Next" href="/page/2">next</a>
        <a href="/ignored">ignored</a>
        "#,
    )
    .await;
    mount_page(
        &server,
        "/page/2",
        r#"<div class="product"><span class="name">Gizmo</span><span class="price">$42</span></div>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/ignored"))
        .respond_with(html_page("nope"))
        .expect(0)
        .mount(&server)
        .await;

    let item_rule = ItemRule::new(
        "product",
        ExtractionRule::for_tag("div").with_attribute("class", "product"),
    )
    .with_field(
        "name",
        ExtractionRule::for_tag("span").with_attribute("class", "name"),
    )
    .with_field(
        "price",
        ExtractionRule::for_tag("span")
            .with_attribute("class", "price")
            .with_filter(FilterRule {
                less_than: Some(1000.0),
                coerce_to_number: true,
                ..FilterRule::default()
            }),
    );
    let url_rule = UrlRule::new("next")
        .with_extract(ExtractionRule::for_tag("a").with_attribute("title", "Next"));

    let mut options = create_test_options(2, 1);
    options.crawler.allow_empty_item = false;
    let crawler = Crawler::new(options).unwrap();
    let response = crawler
        .crawl(&format!("{}/", server.uri()), vec![item_rule], vec![url_rule])
        .await
        .unwrap();

    assert_eq!(response.metrics.urls_visited, 2);
    assert_eq!(response.metrics.items_found, 2);

    let mut names: Vec<&str> = response
        .items()
        .map(|item| item.fields["name"].as_str())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Gadget", "Gizmo"]);
    assert!(response.items().all(|item| item.item_name == "product"));
}

#[tokio::test]
async fn test_pages_without_items_are_dropped() {
    let server = MockServer::start().await;
    mount_no_robots(&server).await;
    mount_page(&server, "/", &links(&["/a"])).await;
    mount_page(&server, "/a", "nothing").await;

    let mut options = create_test_options(1, 1);
    options.crawler.allow_empty_item = false;
    let crawler = Crawler::new(options).unwrap();
    let response = crawler
        .crawl(&format!("{}/", server.uri()), vec![], vec![])
        .await
        .unwrap();

    assert_eq!(response.metrics.urls_visited, 2);
    assert!(response.results.is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_still_parsed() {
    let server = MockServer::start().await;
    mount_no_robots(&server).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string(links(&["/a"])),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/a", "found").await;

    let crawler = Crawler::new(create_test_options(1, 1)).unwrap();
    let response = crawler
        .crawl(&format!("{}/", server.uri()), vec![], vec![])
        .await
        .unwrap();

    assert_eq!(response.metrics.urls_visited, 2);
}

#[tokio::test]
async fn test_visited_ceiling() {
    let server = MockServer::start().await;
    mount_no_robots(&server).await;
    for i in 0..10 {
        mount_page(&server, &format!("/p/{}", i), &links(&[&format!("/p/{}", i + 1)])).await;
    }

    let mut options = create_test_options(2, 20);
    options.crawler.max_visited_urls = 3;
    let crawler = Crawler::new(options).unwrap();
    let response = crawler
        .crawl(&format!("{}/p/0", server.uri()), vec![], vec![])
        .await
        .unwrap();

    assert_eq!(response.metrics.urls_visited, 3);
    assert_eq!(response.results.len(), 3);
}

#[tokio::test]
async fn test_transport_error_aborts_crawl() {
    let server = MockServer::start().await;
    mount_no_robots(&server).await;
    mount_page(&server, "/", &links(&["http://127.0.0.1:1/dead"])).await;

    let crawler = Crawler::new(create_test_options(2, 1)).unwrap();
    let result = crawler
        .crawl(&format!("{}/", server.uri()), vec![], vec![])
        .await;

    match result {
        Err(TrawlerError::Http { url, .. }) => assert_eq!(url, "http://127.0.0.1:1/dead"),
        other => panic!("expected Http error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stalled_crawl_fails_liveness() {
    let server = MockServer::start().await;
    mount_no_robots(&server).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("slow").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut options = create_test_options(1, 1);
    options.health.liveness_window_ms = 200;
    let crawler = Crawler::new(options).unwrap();
    let result = crawler
        .crawl(&format!("{}/", server.uri()), vec![], vec![])
        .await;

    assert!(matches!(
        result,
        Err(TrawlerError::Health(HealthError::Stalled { window_ms: 200 }))
    ));
}

#[tokio::test]
async fn test_invalid_root_url_is_rejected() {
    let crawler = Crawler::new(create_test_options(1, 1)).unwrap();

    let result = crawler.crawl("ftp://example.com/", vec![], vec![]).await;

    assert!(matches!(result, Err(TrawlerError::Config(_))));
}

/// Page `i` of an `n`-page graph links to three pages derived from `i`
fn graph_links(i: usize, n: usize) -> Vec<String> {
    [(i * 3 + 1) % n, (i * 7 + 2) % n, (i + 1) % n]
        .iter()
        .map(|j| format!("/p/{}", j))
        .collect()
}

#[tokio::test]
async fn test_crawl_terminates_on_cyclic_graphs() {
    for (n, workers) in [(1, 1), (5, 2), (12, 3), (25, 4), (40, 1)] {
        let server = MockServer::start().await;
        mount_no_robots(&server).await;
        for i in 0..n {
            let targets = graph_links(i, n);
            let refs: Vec<&str> = targets.iter().map(String::as_str).collect();
            mount_page(&server, &format!("/p/{}", i), &links(&refs)).await;
        }

        let crawler = Crawler::new(create_test_options(workers, n as i32)).unwrap();
        let response = tokio::time::timeout(
            Duration::from_secs(30),
            crawler.crawl(&format!("{}/p/0", server.uri()), vec![], vec![]),
        )
        .await
        .expect("crawl did not terminate")
        .unwrap();

        let metrics = &response.metrics;
        assert_eq!(metrics.urls_visited, n as u64, "graph of {} pages", n);
        assert_eq!(response.results.len(), n);
        // Every link found is either the first sighting of a page or a duplicate
        assert_eq!(
            metrics.duplicate_urls_found,
            metrics.urls_found - (n as u64 - 1),
            "graph of {} pages",
            n
        );
    }
}

#[tokio::test]
async fn test_task_ceiling_requeues_targets() {
    let server = MockServer::start().await;
    mount_no_robots(&server).await;
    mount_page(&server, "/", &links(&["/c/1", "/c/2", "/c/3", "/c/4"])).await;
    for i in 1..=4 {
        Mock::given(method("GET"))
            .and(path(format!("/c/{}", i)))
            .respond_with(html_page("leaf").set_delay(Duration::from_millis(150)))
            .expect(1)
            .mount(&server)
            .await;
    }

    // One worker loop plus one fetch task fills the ceiling
    let mut options = create_test_options(1, 1);
    options.crawler.max_tasks = 2;
    let crawler = Crawler::new(options).unwrap();
    let response = crawler
        .crawl(&format!("{}/", server.uri()), vec![], vec![])
        .await
        .unwrap();

    assert_eq!(response.metrics.urls_visited, 5);
    assert_eq!(response.results.len(), 5);
}

#[tokio::test]
async fn test_item_ceiling_rejects_later_targets() {
    let server = MockServer::start().await;
    mount_no_robots(&server).await;
    mount_page(
        &server,
        "/",
        &format!(
            r#"<div class="product"><span class="name">Widget</span></div>{}"#,
            links(&["/a", "/b"])
        ),
    )
    .await;
    for page in ["/a", "/b"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html_page("late"))
            .expect(0)
            .mount(&server)
            .await;
    }

    let item_rule = ItemRule::new(
        "product",
        ExtractionRule::for_tag("div").with_attribute("class", "product"),
    )
    .with_field(
        "name",
        ExtractionRule::for_tag("span").with_attribute("class", "name"),
    );

    let mut options = create_test_options(2, 1);
    options.crawler.max_items_found = 1;
    let crawler = Crawler::new(options).unwrap();
    let response = crawler
        .crawl(&format!("{}/", server.uri()), vec![item_rule], vec![])
        .await
        .unwrap();

    assert_eq!(response.metrics.urls_visited, 1);
    assert_eq!(response.metrics.items_found, 1);
    assert_eq!(response.metrics.urls_found, 2);
}

#[tokio::test]
async fn test_links_resolve_after_redirect() {
    let server = MockServer::start().await;
    mount_no_robots(&server).await;
    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/shop/"))
        .mount(&server)
        .await;
    mount_page(&server, "/shop/", &links(&["item"])).await;
    mount_page(&server, "/shop/item", "item page").await;

    let crawler = Crawler::new(create_test_options(1, 1)).unwrap();
    let response = crawler
        .crawl(&format!("{}/shop", server.uri()), vec![], vec![])
        .await
        .unwrap();

    let children: Vec<&str> = response
        .results
        .iter()
        .flat_map(|r| r.extracted_urls.iter())
        .map(|child| child.current_url.as_str())
        .collect();
    assert_eq!(children, vec![format!("{}/shop/item", server.uri())]);
    assert_eq!(response.metrics.urls_visited, 2);
}

#[tokio::test]
async fn test_transport_error_during_readiness_grace() {
    let server = MockServer::start().await;
    mount_no_robots(&server).await;
    mount_page(&server, "/", &links(&["http://127.0.0.1:1/dead"])).await;

    let mut options = create_test_options(2, 1);
    options.health.readiness_grace_ms = 20_000;
    let crawler = Crawler::new(options).unwrap();
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        crawler.crawl(&format!("{}/", server.uri()), vec![], vec![]),
    )
    .await
    .expect("abort waited for the readiness grace period");

    assert!(matches!(result, Err(TrawlerError::Http { .. })));
}
