//! HTTP API for statistical tests
//!
//! Thin axum layer over [`crate::dispatch`]: every test endpoint delivers its
//! JSON body to the dispatcher and returns the envelope as-is.
//!
//! ## Endpoints
//!
//! - `POST /api/ttest` - Independent two-sample t-test
//! - `POST /api/mannwhitney` - Mann-Whitney U test
//! - `POST /api/anova` - One-way ANOVA
//! - `POST /api/chi2` - Chi-square test of independence
//! - `POST /api/corr` - Pearson correlation
//! - `POST /api/regression` - Simple linear regression
//! - `GET /api/tests` - Supported test identifiers
//! - `GET /health` - Health check
//! - `GET /metrics` - Prometheus-formatted metrics
//!
//! Failures of any kind come back as `400 {"message": "..."}`; unknown test
//! identifiers are `404`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use statserve::api::{create_router, AppState};
//! use statserve::config::ServerConfig;
//!
//! let state = AppState::new(ServerConfig::default())?;
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

use std::{sync::Arc, time::Instant};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use crate::{
    config::ServerConfig,
    dispatch::{self, TestKind, TestResult},
    error::ConfigError,
    metrics::MetricsCollector,
};

#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod tests;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Startup configuration
    config: Arc<ServerConfig>,
    /// Metrics collector for monitoring
    metrics: Arc<MetricsCollector>,
    /// CORS policy built from `config.cors`
    cors: CorsLayer,
}

impl AppState {
    /// Create state from a configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configured CORS origin is not a valid header value
    pub fn new(config: ServerConfig) -> Result<Self, ConfigError> {
        let cors = config.cors.layer()?;
        Ok(Self {
            config: Arc::new(config),
            metrics: Arc::new(MetricsCollector::new()),
            cors,
        })
    }

    /// Configuration the server was started with
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Metrics collector
    #[must_use]
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            message: message.into(),
        }),
    )
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let cors = state.cors.clone();
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/tests", get(list_tests_handler))
        .route("/api/:test", post(test_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Metrics handler - returns Prometheus-formatted metrics
async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.to_prometheus()
}

/// Supported test identifiers
async fn list_tests_handler() -> Json<Vec<&'static str>> {
    Json(dispatch::list_tests())
}

/// Run one statistical test
async fn test_handler(
    State(state): State<AppState>,
    Path(test): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TestResult>, ApiError> {
    let kind: TestKind = test
        .parse()
        .map_err(|e: crate::error::StatserveError| api_error(StatusCode::NOT_FOUND, e.to_string()))?;

    let Json(payload) = payload.map_err(|rejection| {
        debug!(test = %kind, error = %rejection, "rejected request body");
        state.metrics.record_failure(kind);
        api_error(StatusCode::BAD_REQUEST, rejection.body_text())
    })?;

    let start = Instant::now();
    match dispatch::run(kind, payload) {
        Ok(result) => {
            state.metrics.record_success(kind, start.elapsed());
            Ok(Json(result))
        },
        Err(err) => {
            state.metrics.record_failure(kind);
            Err(api_error(StatusCode::BAD_REQUEST, err.message))
        },
    }
}
