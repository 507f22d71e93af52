//! Widget REST API routes.
//!
//! This module implements Axum route handlers for the five widget
//! operations. All handlers call the store through the shared
//! `WidgetDao`, and responses wrap records in the original JSON
//! envelopes: `{"widget": ...}` for single records and
//! `{"widgets": [...]}` for collections.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use widget_core::{Widget, WidgetBuilder, WidgetPatch};
use widget_store::WidgetDao;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// STATE
// ============================================================================

/// Shared state for the widget routes.
pub struct WidgetState {
    pub dao: Arc<WidgetDao>,
    /// List size cap applied when a request does not supply a limit.
    pub default_limit: i32,
}

// ============================================================================
// REQUEST / RESPONSE TYPES
// ============================================================================

/// Query parameters accepted by the list endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Maximum number of widgets to return.
    pub limit: Option<i32>,
    /// Exclusive pagination cursor: only widgets with a key strictly
    /// greater than this value are returned.
    pub offset_key: Option<String>,
}

/// Single-record response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct WidgetEnvelope {
    pub widget: Widget,
}

/// Collection response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct WidgetListEnvelope {
    pub widgets: Vec<Widget>,
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /tenants/{tenantKey}/widgets - List widgets in a tenant.
pub async fn list_widgets(
    State(state): State<Arc<WidgetState>>,
    Path(tenant_key): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(state.default_limit);
    if limit < 1 {
        return Err(ApiError::invalid_range("limit", "a positive integer"));
    }
    let offset_key = params.offset_key.unwrap_or_default();

    let widgets = state.dao.list(&tenant_key, limit, &offset_key).await?;
    Ok(Json(WidgetListEnvelope { widgets }))
}

/// POST /tenants/{tenantKey}/widgets - Create a widget.
///
/// The tenant key always comes from the path; a tenantKey in the body
/// is ignored.
pub async fn create_widget(
    State(state): State<Arc<WidgetState>>,
    Path(tenant_key): Path<String>,
    Json(builder): Json<WidgetBuilder>,
) -> ApiResult<impl IntoResponse> {
    let widget = builder.tenant_key(tenant_key).build()?;
    let created = state.dao.create(widget).await?;
    Ok((StatusCode::CREATED, Json(WidgetEnvelope { widget: created })))
}

/// GET /tenants/{tenantKey}/widgets/{key} - Retrieve a widget.
pub async fn retrieve_widget(
    State(state): State<Arc<WidgetState>>,
    Path((tenant_key, key)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let widget = state
        .dao
        .retrieve(&tenant_key, &key)
        .await?
        .ok_or_else(|| ApiError::widget_not_found(&tenant_key, &key))?;
    Ok(Json(WidgetEnvelope { widget }))
}

/// PUT /tenants/{tenantKey}/widgets/{key} - Update a widget.
///
/// The body is a partial patch; absent fields keep their current
/// values. A patch that changes tenantKey or key moves the record, and
/// the response carries the record at its new identity.
pub async fn update_widget(
    State(state): State<Arc<WidgetState>>,
    Path((tenant_key, key)): Path<(String, String)>,
    Json(patch): Json<WidgetPatch>,
) -> ApiResult<impl IntoResponse> {
    let widget = state.dao.update(&tenant_key, &key, &patch).await?;
    Ok(Json(WidgetEnvelope { widget }))
}

/// DELETE /tenants/{tenantKey}/widgets/{key} - Delete a widget.
///
/// Responds with the record that was deleted.
pub async fn delete_widget(
    State(state): State<Arc<WidgetState>>,
    Path((tenant_key, key)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let widget = state.dao.delete(&tenant_key, &key).await?;
    Ok(Json(WidgetEnvelope { widget }))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the widget routes router.
pub fn create_router(dao: Arc<WidgetDao>, default_limit: i32) -> Router {
    let state = Arc::new(WidgetState { dao, default_limit });

    Router::new()
        .route(
            "/tenants/:tenant_key/widgets",
            get(list_widgets).post(create_widget),
        )
        .route(
            "/tenants/:tenant_key/widgets/:key",
            get(retrieve_widget)
                .put(update_widget)
                .delete(delete_widget),
        )
        .with_state(state)
}
