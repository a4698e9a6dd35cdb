use crate::{Relay, RelayConfig, ws_handler};
use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub fn router(relay: Relay, config: &RelayConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(&config.path, get(ws_handler))
        .layer(cors)
        .with_state(relay)
}

/// Binds `config.bind` and serves the relay until ctrl-c.
pub async fn serve(config: RelayConfig, relay: Relay) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    info!(
        "Voice relay listening on ws://{}{}",
        listener.local_addr()?,
        config.path
    );

    axum::serve(listener, router(relay, &config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Relay server terminated")?;

    info!("Voice relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
