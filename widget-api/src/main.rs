//! Widget API server entry point.
//!
//! Bootstraps configuration and logging, wires the DAO over an
//! in-memory session, and starts the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tracing_subscriber::EnvFilter;

use widget_api::{create_api_router, ApiConfig, ApiError, ApiResult};
use widget_store::{InMemorySession, StoreSession, WidgetDao};

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ApiConfig::from_env();

    let session: Arc<dyn StoreSession> =
        Arc::new(InMemorySession::with_page_size(config.page_size));
    let dao = Arc::new(WidgetDao::new(session));

    let app: Router = create_api_router(dao, &config);

    let addr: SocketAddr = config
        .bind_addr()
        .parse()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address: {}", e)))?;
    tracing::info!(%addr, "Starting widget API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
