//! Widget API - REST surface over the widget store.
//!
//! Exposes the five widget operations as JSON endpoints under
//! `/app/api/v1`, maps store failures to HTTP statuses (`NotFound` to
//! 404, everything else to 500 with the failure's message), and wraps
//! responses in the `{"widget": ...}` / `{"widgets": [...]}` envelopes.

pub mod config;
pub mod error;
pub mod routes;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
