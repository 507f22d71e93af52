//! API configuration module.
//!
//! Configuration is loaded from environment variables with sensible
//! defaults for development.

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for binding and list behavior.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind the HTTP listener to.
    pub bind: String,

    /// Port to bind the HTTP listener to.
    pub port: u16,

    /// Page size the backing session fetches rows in.
    pub page_size: usize,

    /// List size cap applied when a request does not supply a limit.
    pub default_limit: i32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            page_size: 100,
            default_limit: 10,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `WIDGET_API_BIND`: Host to bind to (default: 0.0.0.0)
    /// - `PORT` or `WIDGET_API_PORT`: Port to bind to (default: 3000)
    /// - `WIDGET_PAGE_SIZE`: Session fetch page size (default: 100)
    /// - `WIDGET_DEFAULT_LIMIT`: List size cap when unspecified (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind = std::env::var("WIDGET_API_BIND").unwrap_or(defaults.bind);

        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("WIDGET_API_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let page_size = std::env::var("WIDGET_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.page_size);

        let default_limit = std::env::var("WIDGET_DEFAULT_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.default_limit);

        Self {
            bind,
            port,
            page_size,
            default_limit,
        }
    }

    /// The socket address string the listener binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
