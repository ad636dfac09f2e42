//! Integration tests for `GET /rss`.

use feedscout::config::Config;
use feedscout::fetch::Fetcher;
use feedscout::server::{self, AppState};
use feedscout::util::SystemClock;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const SAMPLE_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Example News</title>
    <description>All the news</description>
    <item>
      <guid>post-1</guid>
      <title>First</title>
      <link>https://example.com/1</link>
      <description>Body one</description>
      <pubDate>Thu, 28 Dec 2023 06:15:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

async fn spawn_app(config: Config) -> String {
    let state = Arc::new(AppState::new(
        &config,
        Arc::new(Fetcher::new()),
        Arc::new(SystemClock),
    ));
    let app = server::router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_missing_url_is_400() {
    let app = spawn_app(Config::default()).await;
    let response = reqwest::get(format!("{app}/rss")).await.unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_normalized_feed_round_trip() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SAMPLE_RSS)
                .insert_header("Content-Type", "application/rss+xml"),
        )
        .mount(&upstream)
        .await;

    let app = spawn_app(Config::default()).await;
    let feed_url = format!("{}/feed.xml", upstream.uri());
    let response = reqwest::get(format!("{app}/rss?url={feed_url}"))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["feedType"], "rss");
    assert_eq!(body["title"], "Example News");
    assert_eq!(body["description"], "All the news");
    assert_eq!(body["link"], feed_url);

    let item = &body["items"][0];
    assert_eq!(item["id"], "post-1");
    assert_eq!(item["title"], "First");
    assert_eq!(item["link"], "https://example.com/1");
    assert_eq!(item["content"], "Body one");
    assert_eq!(item["description"], "Body one");
    assert_eq!(item["pubDate"], "2023-12-28T06:15:00Z");
    assert_eq!(item["imageUrl"], "");
    assert_eq!(item["sourceName"], "Example News");
}

#[tokio::test]
async fn test_zero_entry_feed_is_404() {
    let upstream = MockServer::start().await;
    let empty = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Empty</title></channel></rss>"#;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(empty))
        .mount(&upstream)
        .await;

    let app = spawn_app(Config::default()).await;
    let response = reqwest::get(format!("{app}/rss?url={}/feed", upstream.uri()))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("no articles"));
}

#[tokio::test]
async fn test_upstream_status_propagates_verbatim() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&upstream)
        .await;

    let app = spawn_app(Config::default()).await;
    let response = reqwest::get(format!("{app}/rss?url={}/feed", upstream.uri()))
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_upstream_timeout_is_504() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SAMPLE_RSS)
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&upstream)
        .await;

    let app = spawn_app(Config {
        feed_timeout_secs: 1,
        ..Config::default()
    })
    .await;

    let response = reqwest::get(format!("{app}/rss?url={}/feed", upstream.uri()))
        .await
        .unwrap();
    assert_eq!(response.status(), 504);
}

#[tokio::test]
async fn test_unparseable_body_is_500() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<definitely not a feed"))
        .mount(&upstream)
        .await;

    let app = spawn_app(Config::default()).await;
    let response = reqwest::get(format!("{app}/rss?url={}/feed", upstream.uri()))
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
}

#[tokio::test]
async fn test_bypass_cache_hits_upstream_again() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_RSS))
        .expect(2)
        .mount(&upstream)
        .await;

    let app = spawn_app(Config::default()).await;
    let feed_url = format!("{}/feed", upstream.uri());

    let first = reqwest::get(format!("{app}/rss?url={feed_url}")).await.unwrap();
    assert_eq!(first.status(), 200);
    let second = reqwest::get(format!("{app}/rss?url={feed_url}&bypassCache=true"))
        .await
        .unwrap();
    assert_eq!(second.status(), 200);
    // upstream mock verifies both hits on drop.
}
