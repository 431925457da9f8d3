use std::sync::Arc;
use std::time::Duration;

use feedwatch::{
    EngineEvent, EngineState, FeedError, FeedSource, FetchSettings, Fetcher, IngestionEngine,
    ReqwestFetcher, RssParser,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED_A: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>A</title>
    <item><guid>a1</guid><title>A one</title><link>https://a.example/1</link></item>
    <item><guid>shared</guid><title>Shared via A</title><link>https://a.example/shared</link></item>
  </channel>
</rss>"#;

const FEED_B: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>B</title>
    <item><guid>b1</guid><title>B one</title><link>https://b.example/1</link></item>
    <item><guid>shared</guid><title>Shared via B</title><link>https://b.example/shared</link></item>
  </channel>
</rss>"#;

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

fn rss(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "application/rss+xml")
}

fn fetcher() -> ReqwestFetcher {
    ReqwestFetcher::new(FetchSettings::default()).expect("client")
}

fn engine() -> IngestionEngine {
    IngestionEngine::new(Arc::new(fetcher()), Arc::new(RssParser::new()))
}

async fn settle(engine: &IngestionEngine) {
    tokio::time::timeout(Duration::from_secs(10), engine.wait_idle())
        .await
        .expect("engine should go idle");
}

// -- transport ---------------------------------------------------------------

#[tokio::test]
async fn fetcher_returns_status_and_body() {
    let server = MockServer::start().await;
    mount(&server, "/feed", rss(FEED_A)).await;

    let response = fetcher()
        .fetch(&format!("{}/feed", server.uri()))
        .await
        .expect("fetch ok");

    assert_eq!(response.status, 200);
    assert_eq!(response.body.as_ref(), FEED_A.as_bytes());
}

#[tokio::test]
async fn fetcher_passes_error_statuses_through() {
    let server = MockServer::start().await;
    mount(&server, "/missing", ResponseTemplate::new(404)).await;

    let response = fetcher()
        .fetch(&format!("{}/missing", server.uri()))
        .await
        .expect("a 404 is still a response");
    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/slow",
        rss(FEED_A).set_delay(Duration::from_millis(500)),
    )
    .await;

    let fetcher = ReqwestFetcher::new(FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    })
    .unwrap();

    let err = fetcher
        .fetch(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::Transport(_)));
}

// -- full poll cycle ---------------------------------------------------------

#[tokio::test]
async fn poll_ingests_every_feed_once() {
    let server = MockServer::start().await;
    mount(&server, "/a", rss(FEED_A)).await;
    mount(&server, "/b", rss(FEED_B)).await;

    let engine = engine();
    let sources = vec![
        FeedSource::new("a", format!("{}/a", server.uri())).unwrap(),
        FeedSource::new("b", format!("{}/b", server.uri())).unwrap(),
    ];

    engine.start_poll(&sources);
    settle(&engine).await;
    let first = engine.snapshot();

    // Cross-feed order is not fixed, only the contents and per-feed order.
    let mut guids: Vec<_> = first.iter().map(|i| i.guid.clone()).collect();
    guids.sort();
    assert_eq!(guids, vec!["a1", "b1", "shared"]);
    let pos = |g: &str| first.iter().position(|i| i.guid == g).unwrap();
    assert!(pos("a1") < pos("shared") || pos("b1") < pos("shared"));

    engine.start_poll(&sources);
    settle(&engine).await;
    assert_eq!(engine.snapshot(), first);
    assert_eq!(engine.state(), EngineState::Idle);
}

#[tokio::test]
async fn failed_feed_is_isolated_and_reported() {
    let server = MockServer::start().await;
    mount(&server, "/down", ResponseTemplate::new(503)).await;
    mount(&server, "/b", rss(FEED_B)).await;

    let engine = engine();
    let mut subscription = engine.subscribe();
    let down_url = format!("{}/down", server.uri());

    engine.start_poll(&[
        FeedSource::new("down", down_url.clone()).unwrap(),
        FeedSource::new("b", format!("{}/b", server.uri())).unwrap(),
    ]);
    settle(&engine).await;

    let guids: Vec<_> = engine.snapshot().into_iter().map(|i| i.guid).collect();
    assert_eq!(guids, vec!["b1", "shared"]);

    let mut failed = None;
    while let Ok(event) = subscription.events.try_recv() {
        if let EngineEvent::FeedFailed { feed_id, url, error } = event {
            failed = Some((feed_id, url, error));
        }
    }
    assert_eq!(
        failed,
        Some(("down".to_string(), down_url, FeedError::HttpStatus(503)))
    );
}
