use anyhow::Context;
use std::net::SocketAddr;
use tracing::info;

use pokedex_api::app::{app, build_store, AppState};
use pokedex_api::config::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, POKEDEX_STORE, etc.
    let _ = dotenvy::dotenv();

    pokedex_api::init_tracing();

    let config = config();
    info!("Starting Pokedex API in {:?} mode", config.environment);

    let store = build_store(config).await?;
    let app = app(AppState::new(store), config);

    let bind_addr = format!("{}:{}", config.server.bind_addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Pokedex API listening on http://{}", bind_addr);

    // Peer addresses feed the per-caller rate limiter
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Pokedex API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
