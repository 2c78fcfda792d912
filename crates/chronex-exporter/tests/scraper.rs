//! HTTP scraper tests against a local axum upstream.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};

use chronex_core::error::ErrorCode;
use chronex_exporter::config::UpstreamSection;
use chronex_exporter::scraper::{HttpScraper, Scraper};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn upstream(uri: String) -> UpstreamSection {
    UpstreamSection {
        uri,
        timeout_ms: 2000,
        retry_interval_ms: 100,
        ..UpstreamSection::default()
    }
}

#[tokio::test]
async fn ping_ok_and_scrape_body() {
    let app = Router::new()
        .route("/ping", get(|| async { "pong" }))
        .route("/metrics", get(|| async { r#"{"counters":{}}"# }));
    let scraper = HttpScraper::new(&upstream(serve(app).await)).unwrap();

    scraper.ping().await.unwrap();
    let body = scraper.scrape().await.unwrap();
    assert_eq!(&body[..], br#"{"counters":{}}"#);
}

#[tokio::test]
async fn ping_requires_200() {
    let app = Router::new()
        .route("/ping", get(|| async { StatusCode::NO_CONTENT }))
        .route("/v2/ping", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
    let uri = serve(app).await;

    let err = HttpScraper::new(&upstream(uri.clone())).unwrap().ping().await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::UpstreamUnreachable);

    let cfg = UpstreamSection {
        ping_path: "/v2/ping".into(),
        ..upstream(uri)
    };
    let err = HttpScraper::new(&cfg).unwrap().ping().await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::UpstreamUnreachable);
}

#[tokio::test]
async fn scrape_rejects_non_success_status() {
    let app = Router::new().route(
        "/metrics",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let scraper = HttpScraper::new(&upstream(serve(app).await)).unwrap();

    let err = scraper.scrape().await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::UpstreamUnreachable);
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn scrape_unreachable_upstream() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let scraper = HttpScraper::new(&upstream(format!("http://{addr}"))).unwrap();
    let err = scraper.scrape().await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::UpstreamUnreachable);
}

#[tokio::test]
async fn wait_until_connected_retries() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let app = Router::new().route(
        "/ping",
        get(move || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    StatusCode::SERVICE_UNAVAILABLE
                } else {
                    StatusCode::OK
                }
            }
        }),
    );
    let scraper = HttpScraper::new(&upstream(serve(app).await)).unwrap();

    tokio::time::timeout(Duration::from_secs(5), scraper.wait_until_connected())
        .await
        .expect("must connect after retries");
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}
