//! Shared helpers for API integration tests.
//!
//! Builds the application router exactly as `main.rs` does (same middleware
//! stack) against the test database pool provided by `#[sqlx::test]`.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use curio_api::auth::jwt::{generate_access_token, JwtConfig};
use curio_api::cache::StatusCache;
use curio_api::config::ServerConfig;
use curio_api::router::build_app_router;
use curio_api::state::AppState;
use curio_core::types::DbId;
use curio_events::EventBus;

/// Build a test `ServerConfig` with safe defaults.
///
/// The status cache TTL is zero so tests always observe fresh store state;
/// cache semantics themselves are covered by unit tests in `cache.rs`.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        status_cache_ttl_ms: 0,
        jwt: test_jwt_config(),
    }
}

/// JWT config with a fixed secret shared by [`bearer`] token minting.
pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret-long-enough-for-hmac".to_string(),
        access_token_expiry_mins: 15,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let status_cache = Arc::new(StatusCache::new(Duration::from_millis(
        config.status_cache_ttl_ms,
    )));
    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        status_cache,
        event_bus,
    };

    build_app_router(state, &config)
}

/// Mint a `Bearer ...` header value for the given actor and role.
pub fn bearer(actor_id: DbId, role: &str) -> String {
    let token = generate_access_token(actor_id, role, &test_jwt_config())
        .expect("token generation should succeed");
    format!("Bearer {token}")
}

/// Issue a GET request without authentication.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    app.oneshot(request).await.expect("request should not fail")
}

/// Issue a GET request with a `Bearer` token.
pub async fn get_auth(app: Router, uri: &str, authorization: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", authorization)
        .body(Body::empty())
        .expect("request should build");
    app.oneshot(request).await.expect("request should not fail")
}

/// Issue a POST request with a JSON body and optional `Bearer` token.
pub async fn post_json(
    app: Router,
    uri: &str,
    authorization: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(authorization) = authorization {
        builder = builder.header("authorization", authorization);
    }
    let request = builder
        .body(Body::from(body.to_string()))
        .expect("request should build");
    app.oneshot(request).await.expect("request should not fail")
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// Register a product through the API (admin token) and return its id.
pub async fn seed_product(app: &Router, title: &str, total_stock: i32) -> DbId {
    let response = post_json(
        app.clone(),
        "/api/v1/products",
        Some(&bearer(1, "admin")),
        serde_json::json!({ "title": title, "total_stock": total_stock }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_i64().expect("product id")
}
