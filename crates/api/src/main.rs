mod config;
mod error;
mod metrics;
mod routes;

use anyhow::{Context, Result};
use std::str::FromStr;
use std::sync::Arc;
use store::SaveStore;

use config::{AppConfig, LogFormat};
use routes::{AppState, build_router};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config)?;

    let store = SaveStore::new(&config.saves_root, config.listing);
    if !store.root_exists() {
        tracing::warn!(
            root = %config.saves_root.display(),
            "Saves directory not found; listings will return 404 until it exists"
        );
    }

    let state = Arc::new(AppState::new(store, config.presenter));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!(
        root = %config.saves_root.display(),
        labels = %config.presenter.labels,
        "Server listening on http://{}",
        config.bind_addr
    );

    axum::serve(listener, app).await.context("Server stopped")?;
    Ok(())
}

fn init_tracing(config: &AppConfig) -> Result<()> {
    let level = tracing::Level::from_str(&config.logging.level)
        .with_context(|| format!("Unknown log level: {}", config.logging.level))?;
    let builder = tracing_subscriber::fmt().with_max_level(level);

    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
    Ok(())
}
