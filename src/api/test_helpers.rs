//! Shared helpers for api tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use super::*;

/// Create a test application with default configuration
pub fn create_test_app() -> Router {
    let state = AppState::new(ServerConfig::default()).expect("test");
    create_router(state)
}

/// Create a test application and keep a handle on its state
pub fn create_test_app_with_state() -> (Router, AppState) {
    let state = AppState::new(ServerConfig::default()).expect("test");
    (create_router(state.clone()), state)
}

/// POST a raw JSON body and return status plus parsed body
pub async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("test"),
        )
        .await
        .expect("test");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("test");
    (status, serde_json::from_slice(&bytes).expect("test"))
}

/// GET a path and return status plus raw body
pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("test"),
        )
        .await
        .expect("test");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("test");
    (status, String::from_utf8(bytes.to_vec()).expect("test"))
}
