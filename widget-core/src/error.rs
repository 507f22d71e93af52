//! Error types for widget operations
//!
//! The taxonomy distinguishes three failure shapes surfaced by the store
//! layer: a missing record (`NotFound`, a normal outcome for mutating
//! operations), a statement the store rejected or failed to run
//! (`Execution`), and an operation cancelled before it settled
//! (`Cancelled`). Nothing in the store layer swallows or retries an error;
//! every failure propagates through the returned future.

use std::sync::Arc;
use thiserror::Error;

/// Failure reported by the store driver while preparing or executing a
/// statement, or while fetching a result page.
///
/// The original cause is preserved unmodified behind an `Arc` so the error
/// stays cheap to clone as it travels through completion callbacks.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct DriverError {
    message: String,
    #[source]
    source: Option<Arc<dyn std::error::Error + Send + Sync + 'static>>,
}

impl DriverError {
    /// Create a driver error from a message alone.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a driver error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    /// The driver's failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Store layer errors.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// No record matched the composite identity. Carries the requested
    /// identifier so callers can name it; surfaced as a normal failure
    /// outcome, not a programming error.
    #[error("widget \"{key}\" was not found in tenant \"{tenant_key}\"")]
    NotFound { tenant_key: String, key: String },

    /// The store rejected or failed to execute a statement. Wraps the
    /// driver's failure unmodified.
    #[error("statement execution failed: {0}")]
    Execution(#[from] DriverError),

    /// The operation was cancelled before it completed. Distinct from
    /// `Execution` so callers can tell "aborted" from "store rejected".
    #[error("operation was cancelled before it completed")]
    Cancelled,
}

impl StoreError {
    /// Create a `NotFound` error for the given composite identity.
    pub fn not_found(tenant_key: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            tenant_key: tenant_key.into(),
            key: key.into(),
        }
    }

    /// Whether this error is a `NotFound` outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Validation errors raised while constructing domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required field missing: {field}")]
    RequiredFieldMissing { field: &'static str },
}

/// Result type alias for widget store operations.
pub type WidgetResult<T> = Result<T, StoreError>;

// =============================================================================
// TESTS
// =============================================================================
