//! Court Calendar Search: HTTP query service entrypoint.
//! Boots the Axum server around the search engine, plus `/metrics`.

use std::sync::Arc;

use anyhow::{Context, Result};
use court_calendar_search::metrics::Metrics;
use court_calendar_search::{api, init_tracing, CourtSearch, HttpCalendarSource, SearchConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = SearchConfig::from_env();
    let metrics = Metrics::init(&cfg)?;
    let source = HttpCalendarSource::from_config(&cfg)?;
    tracing::info!(
        base_url = %cfg.base_url,
        window_days = cfg.window_days,
        max_concurrency = cfg.max_concurrency,
        "court calendar source configured"
    );

    let search = CourtSearch::new(Arc::new(source), cfg);
    let app = api::router(api::AppState::new(search)).merge(metrics.router());

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "court calendar api listening");

    axum::serve(listener, app).await.context("serving http")?;
    Ok(())
}
