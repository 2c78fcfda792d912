//! chronex exporter
//!
//! Polls a Dropwizard-style `/metrics` endpoint on every Prometheus scrape and
//! serves the translated families on `exporter.telemetry_path`.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use chronex_exporter::{app_state, config, router, scraper::HttpScraper};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "chronex_exporter=info".into()),
        )
        .init();

    let path = std::env::var("CHRONEX_CONFIG").unwrap_or_else(|_| config::DEFAULT_PATH.into());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg.exporter.listen.parse()?;

    let scraper = Arc::new(HttpScraper::new(&cfg.upstream)?);
    tracing::info!(uri = %cfg.upstream.uri, "waiting for upstream");
    scraper.wait_until_connected().await;

    let state = app_state::AppState::new(cfg, scraper);
    let app = router::build_router(state);

    tracing::info!(%listen, "chronex-exporter starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app).await?;
    Ok(())
}
