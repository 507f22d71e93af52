//! REST API routes module.
//!
//! Includes:
//! - Widget CRUD routes under the versioned prefix
//! - Health check endpoints
//! - Version endpoint
//! - Request tracing for all routes

pub mod health;
pub mod widget;

use std::sync::Arc;

use axum::{response::IntoResponse, routing::get, Json, Router};
use tower_http::trace::TraceLayer;

use widget_store::WidgetDao;

use crate::config::ApiConfig;

// Re-export route creation functions for convenience
pub use health::create_router as health_router;
pub use widget::create_router as widget_router;

/// Versioned prefix every widget route lives under.
pub const API_PREFIX: &str = "/app/api/v1";

// ============================================================================
// VERSION ENDPOINT
// ============================================================================

/// Handler for the version endpoint.
async fn version() -> impl IntoResponse {
    Json(serde_json::json!({
        "version": concat!("v", env!("CARGO_PKG_VERSION")),
    }))
}

// ============================================================================
// ROUTER ASSEMBLY
// ============================================================================

/// Create the complete API router.
///
/// Widget routes are nested under [`API_PREFIX`]; health endpoints sit
/// outside the versioned prefix so probes survive an API version bump.
pub fn create_api_router(dao: Arc<WidgetDao>, config: &ApiConfig) -> Router {
    let api = widget_router(dao, config.default_limit)
        .route("/version", get(version));

    Router::new()
        .nest(API_PREFIX, api)
        .nest("/health", health_router())
        .layer(TraceLayer::new_for_http())
}
