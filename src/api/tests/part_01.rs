//! API Tests Part 01: service endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use crate::api::{
    test_helpers::{create_test_app, create_test_app_with_state, get_text, post_json},
    AppState, HealthResponse,
};
use crate::config::{CorsConfig, ServerConfig};

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = get_text(create_test_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);

    let health: HealthResponse = serde_json::from_str(&body).expect("test");
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, crate::VERSION);
}

// =============================================================================
// Test listing
// =============================================================================

#[tokio::test]
async fn test_list_tests_endpoint() {
    let (status, body) = get_text(create_test_app(), "/api/tests").await;
    assert_eq!(status, StatusCode::OK);

    let tests: Vec<String> = serde_json::from_str(&body).expect("test");
    assert_eq!(
        tests,
        vec!["ttest", "mannwhitney", "anova", "chi2", "corr", "regression"]
    );
}

#[tokio::test]
async fn test_list_tests_is_idempotent() {
    let (_, first) = get_text(create_test_app(), "/api/tests").await;
    let (_, second) = get_text(create_test_app(), "/api/tests").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_wrong_method_is_rejected() {
    let (status, _) = get_text(create_test_app(), "/api/nonexistent").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let response = create_test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/tests")
                .body(Body::empty())
                .expect("test"),
        )
        .await
        .expect("test");
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// Metrics
// =============================================================================

#[tokio::test]
async fn test_metrics_endpoint_format() {
    let (status, body) = get_text(create_test_app(), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("# TYPE statserve_requests_total counter"));
    assert!(body.contains("statserve_requests_total 0\n"));
}

#[tokio::test]
async fn test_metrics_count_requests() {
    let (app, state) = create_test_app_with_state();

    let (status, _) = post_json(
        app.clone(),
        "/api/ttest",
        r#"{"group1": [1, 2, 3], "group2": [4, 5, 6]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_json(app.clone(), "/api/ttest", r#"{"group1": [1]}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let snapshot = state.metrics().snapshot();
    assert_eq!(snapshot.total_requests, 2);
    assert_eq!(snapshot.successful_requests, 1);
    assert_eq!(snapshot.failed_requests, 1);

    let (_, body) = get_text(app, "/metrics").await;
    assert!(body.contains("statserve_test_requests_total{test=\"ttest\",outcome=\"success\"} 1"));
    assert!(body.contains("statserve_test_requests_total{test=\"ttest\",outcome=\"error\"} 1"));
}

// =============================================================================
// CORS
// =============================================================================

#[tokio::test]
async fn test_cors_any_origin() {
    let response = create_test_app()
        .oneshot(
            Request::builder()
                .uri("/api/tests")
                .header("origin", "https://notebook.example.org")
                .body(Body::empty())
                .expect("test"),
        )
        .await
        .expect("test");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .expect("test"),
        "*"
    );
}

#[tokio::test]
async fn test_cors_preflight() {
    let response = create_test_app()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/ttest")
                .header("origin", "https://notebook.example.org")
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "content-type")
                .body(Body::empty())
                .expect("test"),
        )
        .await
        .expect("test");

    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key("access-control-allow-methods"));
}

#[tokio::test]
async fn test_cors_origin_list() {
    let config = ServerConfig::new().with_cors(CorsConfig::List(vec![
        "https://allowed.example".to_string(),
    ]));
    let app = crate::api::create_router(AppState::new(config).expect("test"));

    let request = |origin: &str| {
        Request::builder()
            .uri("/health")
            .header("origin", origin)
            .body(Body::empty())
            .expect("test")
    };

    let allowed = app
        .clone()
        .oneshot(request("https://allowed.example"))
        .await
        .expect("test");
    assert_eq!(
        allowed
            .headers()
            .get("access-control-allow-origin")
            .expect("test"),
        "https://allowed.example"
    );

    let denied = app
        .oneshot(request("https://other.example"))
        .await
        .expect("test");
    assert!(denied
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}

#[test]
fn test_app_state_keeps_config() {
    let state = AppState::new(ServerConfig::new().with_port(6000)).expect("test");
    assert_eq!(state.config().port, 6000);
    assert_eq!(state.metrics().snapshot().total_requests, 0);
}
