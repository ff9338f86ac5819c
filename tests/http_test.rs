use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::Router;
use http::{header, Method, Request, StatusCode};
use tower::ServiceExt;

use quali_api::routes;
use quali_api::utils::{config::Config, state::AppState};

/// Router wired to an unreachable upstream so no test touches the network.
fn test_app(tag: &str) -> Router {
    let cache_dir = std::env::temp_dir().join(format!(
        "quali-api-http-test-{tag}-{}",
        std::process::id()
    ));
    let config = Config {
        cache_dir: cache_dir.to_string_lossy().into_owned(),
        jolpica_base_url: "http://127.0.0.1:9".to_string(),
        openf1_base_url: "http://127.0.0.1:9".to_string(),
    };
    routes::app(Arc::new(AppState::init(config).unwrap()))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn hello_returns_greeting() {
    let response = test_app("hello")
        .oneshot(
            Request::builder()
                .uri("/hello/Ada")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, serde_json::json!({"message": "Hello Ada"}));
}

#[tokio::test]
async fn pre_timing_api_season_is_rejected() {
    let response = test_app("pre2018")
        .oneshot(
            Request::builder()
                .uri("/?y=2017&r=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("2017"));
}

#[tokio::test]
async fn unreachable_upstream_yields_server_error() {
    let response = test_app("upstream")
        .oneshot(
            Request::builder()
                .uri("/?y=2023&r=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn cors_allows_local_dev_origin() {
    let response = test_app("cors")
        .oneshot(
            Request::builder()
                .uri("/hello/Ada")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
}

#[tokio::test]
async fn cors_preflight_mirrors_requested_method() {
    let response = test_app("preflight")
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/")
                .header(header::ORIGIN, "http://localhost")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost")
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .and_then(|v| v.to_str().ok()),
        Some("GET")
    );
}

#[tokio::test]
async fn unknown_origin_gets_no_cors_headers() {
    let response = test_app("badorigin")
        .oneshot(
            Request::builder()
                .uri("/hello/Ada")
                .header(header::ORIGIN, "http://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
