use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use hemis_schedule::server::create_router;
use hemis_schedule::types::AppState;
use hemis_schedule::{AppConfig, HemisClient, ScheduleStore};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config_file = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_file.as_deref()).context("failed to load configuration")?;

    let store = ScheduleStore::open(&config.db_path)
        .with_context(|| format!("failed to open store at {}", config.db_path.display()))?;
    let client = HemisClient::new(config.hemis.clone())?;

    info!(
        db = %store.path().display(),
        base_url = %config.hemis.base_url,
        legacy_empty_on_error = config.hemis.legacy_empty_on_error,
        "Schedule store ready"
    );

    let listen_addr = config.listen_addr.clone();
    let state = Arc::new(AppState::new(config, store, client));
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;
    info!("Listening on http://{listen_addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl+C, shutting down");
    }
}
