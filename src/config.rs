//! Server configuration
//!
//! Built once at startup from CLI flags (with environment fallbacks) and
//! handed to the router; nothing reads configuration from global state.
//!
//! ## Example
//!
//! ```rust
//! use statserve::config::{CorsConfig, ServerConfig};
//!
//! let config = ServerConfig::new()
//!     .with_host("127.0.0.1")
//!     .with_port(8080)
//!     .with_cors("https://stats.example.org".parse::<CorsConfig>().unwrap());
//! assert_eq!(config.socket_addr().unwrap().port(), 8080);
//! ```

use std::{
    fmt,
    net::{SocketAddr, ToSocketAddrs},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port
pub const DEFAULT_PORT: u16 = 5000;

/// Default `tracing` filter directive
pub const DEFAULT_LOG_FILTER: &str = "info";

// ============================================================================
// CORS
// ============================================================================

/// Which browser origins may call the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorsConfig {
    /// Any origin (`*`)
    #[default]
    Any,
    /// Only these exact origins
    List(Vec<String>),
}

impl FromStr for CorsConfig {
    type Err = ConfigError;

    /// Parse `*` or a comma-separated origin list
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let origins: Vec<String> = s
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() {
            return Err(ConfigError::InvalidOrigin(s.to_string()));
        }
        if origins.iter().any(|o| o == "*") {
            return Ok(CorsConfig::Any);
        }
        if let Some(bad) = origins.iter().find(|o| o.chars().any(char::is_control)) {
            return Err(ConfigError::InvalidOrigin(bad.clone()));
        }
        Ok(CorsConfig::List(origins))
    }
}

impl fmt::Display for CorsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsConfig::Any => f.write_str("*"),
            CorsConfig::List(origins) => f.write_str(&origins.join(",")),
        }
    }
}

#[cfg(feature = "server")]
impl CorsConfig {
    /// Build the `tower-http` CORS layer
    ///
    /// GET and POST with any request header are allowed; only the origin set
    /// varies.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidOrigin`] if an origin is not a valid header value
    pub fn layer(&self) -> Result<tower_http::cors::CorsLayer, ConfigError> {
        use axum::http::{HeaderValue, Method};
        use tower_http::cors::{AllowOrigin, Any, CorsLayer};

        let base = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);

        match self {
            CorsConfig::Any => Ok(base.allow_origin(Any)),
            CorsConfig::List(origins) => {
                let values = origins
                    .iter()
                    .map(|o| {
                        HeaderValue::from_str(o)
                            .map_err(|_| ConfigError::InvalidOrigin(o.clone()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(base.allow_origin(AllowOrigin::list(values)))
            },
        }
    }
}

// ============================================================================
// Server
// ============================================================================

/// Runtime configuration for the HTTP server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host or IP address to bind
    pub host: String,
    /// TCP port to bind
    pub port: u16,
    /// Allowed CORS origins
    pub cors: CorsConfig,
    /// `tracing` filter directive (`RUST_LOG` syntax)
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors: CorsConfig::Any,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ServerConfig {
    /// Create a configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bind host
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set bind port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS origins
    #[must_use]
    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.cors = cors;
        self
    }

    /// Set log filter
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Resolve `host:port` to a bindable address
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidAddress`] when the host is empty or cannot be
    /// resolved
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        let invalid = |reason: String| ConfigError::InvalidAddress {
            addr: addr.clone(),
            reason,
        };

        if self.host.trim().is_empty() {
            return Err(invalid("host is empty".to_string()));
        }

        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| invalid(e.to_string()))?
            .next()
            .ok_or_else(|| invalid("host resolved to no addresses".to_string()))
    }
}
