//! Subscription Analytics Dashboard — Binary Entrypoint
//! Loads the subscription CSV once, then serves the metrics API the
//! dashboard UI renders from.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use subscription_analytics::api::{self, AppState};
use subscription_analytics::config::AppConfig;
use subscription_analytics::ingest;
use subscription_analytics::metrics::Metrics;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("subscription_analytics=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load_default().context("loading dashboard config")?;
    let dataset = ingest::load_csv_file(&cfg.csv_path)?;

    let metrics = Metrics::init(dataset.len());

    let state = AppState::new(dataset, cfg.reference_date);
    let app = api::router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    info!(addr = %cfg.bind_addr, "dashboard API listening");

    axum::serve(listener, app).await.context("serving API")?;
    Ok(())
}
