//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! pagination, slicing, retries and article parsing end-to-end.

use news_harvest::config::Config;
use news_harvest::crawler::{Coordinator, PageCap};
use news_harvest::{crawl_articles, fetch_and_parse, list_links, ScrapeError};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server, without pauses
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.crawler.delay_ms = 0;
    config.transport.backoff_factor = 0.0;
    config.transport.timeout_secs = 5.0;
    config
}

fn index_html(slugs: &[&str], next: Option<&str>) -> String {
    let teasers: String = slugs
        .iter()
        .map(|slug| {
            format!(
                r#"<div class="article"><h3><a href="/news/{}.html">{}</a></h3><p>Teaser</p></div>"#,
                slug, slug
            )
        })
        .collect();
    let nav = next
        .map(|href| format!(r#"<a class="button" href="{}">Next</a>"#, href))
        .unwrap_or_default();

    format!(
        r#"<html><body>
        <header><a href="/news/subscribe.html">Subscribe</a></header>
        <div class="site-list">{}</div>
        <nav>{}</nav>
        </body></html>"#,
        teasers, nav
    )
}

fn article_html(title: &str) -> String {
    format!(
        r#"<html><head>
        <meta property="article:published_time" content="2025-08-29T10:15:00+02:00">
        </head><body><article>
        <h1>{}</h1>
        <h3>29 August 2025</h3>
        <figure class="article-image">
            <img src="/images/{}.jpg">
            <figcaption class="article-image-caption">Photo: Econostream</figcaption>
        </figure>
        <div class="content">
            <p>By Jane Doe – Paris (Econostream) – The European Central Bank kept rates unchanged.</p>
            <p>Markets had expected the decision.</p>
        </div>
        </article></body></html>"#,
        title, title
    )
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_list_links_follows_pagination_in_site_order() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Second page first: the plain path matcher would also match the query
    Mock::given(method("GET"))
        .and(path("/news"))
        .and(query_param("offset", "3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(index_html(&["c", "d"], None)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/news",
        index_html(&["a", "b", "c"], Some("/news?offset=3")),
    )
    .await;

    let config = create_test_config(&base_url);
    let links = list_links(
        &config,
        &config.site.start_url(),
        PageCap::Unbounded,
        Duration::ZERO,
    )
    .await
    .expect("Listing should succeed");

    let expected: Vec<String> = ["a", "b", "c", "d"]
        .iter()
        .map(|slug| format!("{}/news/{}.html", base_url, slug))
        .collect();
    assert_eq!(links, expected);
}

#[tokio::test]
async fn test_page_cap_limits_index_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_html(&["c"], None)))
        .expect(0)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/news",
        index_html(&["a", "b"], Some("/news?offset=2")),
    )
    .await;

    let config = create_test_config(&mock_server.uri());
    let links = list_links(
        &config,
        &config.site.start_url(),
        PageCap::Limited(1),
        Duration::ZERO,
    )
    .await
    .unwrap();

    assert_eq!(links.len(), 2);
}

#[tokio::test]
async fn test_crawl_articles_fetches_only_the_slice() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let slugs = ["s0", "s1", "s2", "s3", "s4"];

    mount_page(&mock_server, "/news", index_html(&slugs, None)).await;
    for (i, slug) in slugs.iter().enumerate() {
        let wanted = (1..=2).contains(&i);
        Mock::given(method("GET"))
            .and(path(format!("/news/{}.html", slug)))
            .respond_with(ResponseTemplate::new(200).set_body_string(article_html(slug)))
            .expect(if wanted { 1 } else { 0 })
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config(&base_url);
    let outcome = crawl_articles(
        &config,
        &config.site.start_url(),
        PageCap::Limited(1),
        1,
        Some(2),
        Duration::ZERO,
    )
    .await
    .expect("Crawl should succeed");

    assert_eq!(outcome.total_candidates, 5);
    let titles: Vec<_> = outcome
        .articles
        .iter()
        .map(|a| a.title.clone().unwrap_or_default())
        .collect();
    assert_eq!(titles, vec!["s1", "s2"]);
    assert_eq!(outcome.articles[0].url, format!("{}/news/s1.html", base_url));
}

#[tokio::test]
async fn test_server_error_retried_until_attempts_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news/broken.html"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let url = format!("{}/news/broken.html", mock_server.uri());
    let err = fetch_and_parse(&config, &url).await.unwrap_err();

    match &err {
        ScrapeError::Status {
            url: failed,
            status,
            attempts,
        } => {
            assert_eq!(failed, &url);
            assert_eq!(*status, 500);
            assert_eq!(*attempts, 3);
        }
        other => panic!("Expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_client_error_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news/missing.html"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let url = format!("{}/news/missing.html", mock_server.uri());
    let err = fetch_and_parse(&config, &url).await.unwrap_err();

    assert!(matches!(err, ScrapeError::Status { status: 404, attempts: 1, .. }));
}

#[tokio::test]
async fn test_transient_unavailable_recovers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news/flaky.html"))
        .respond_with(ResponseTemplate::new(503).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/news/flaky.html", article_html("Flaky")).await;

    let config = create_test_config(&mock_server.uri());
    let url = format!("{}/news/flaky.html", mock_server.uri());
    let article = fetch_and_parse(&config, &url).await.expect("Retry should recover");

    assert_eq!(article.title.as_deref(), Some("Flaky"));
}

#[tokio::test]
async fn test_index_page_failure_aborts_listing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/news",
        index_html(&["a", "b"], Some("/news?offset=2")),
    )
    .await;

    let config = create_test_config(&mock_server.uri());
    let err = list_links(
        &config,
        &config.site.start_url(),
        PageCap::Unbounded,
        Duration::ZERO,
    )
    .await
    .unwrap_err();

    assert!(err.is_transport());
    assert_eq!(
        err.url(),
        Some(format!("{}/news?offset=2", mock_server.uri()).as_str())
    );
}

#[tokio::test]
async fn test_fetch_and_parse_end_to_end() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/news/ecb.html"))
        .and(header("cache-control", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_html("ecb")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let coordinator =
        Coordinator::new(create_test_config(&base_url)).expect("Failed to create coordinator");
    let url = format!("{}/news/ecb.html", base_url);
    let article = coordinator.fetch_and_parse(&url).await.unwrap();

    assert_eq!(article.url, url);
    assert_eq!(article.title.as_deref(), Some("ecb"));
    assert_eq!(
        article.published.map(|d| d.to_string()).as_deref(),
        Some("2025-08-29T10:15:00+02:00")
    );
    assert_eq!(article.author.as_deref(), Some("Jane Doe"));
    assert_eq!(article.location.as_deref(), Some("Paris"));
    assert_eq!(article.image, Some(format!("{}/images/ecb.jpg", base_url)));
    assert_eq!(article.caption.as_deref(), Some("Photo: Econostream"));
    assert_eq!(
        article.text.as_deref(),
        Some(
            "By Jane Doe – Paris (Econostream) – The European Central Bank kept rates unchanged.\n\n\
             Markets had expected the decision."
        )
    );
    assert_eq!(article.word_count, 19);
}
