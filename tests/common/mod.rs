#![allow(dead_code)]

use axum::body::Body;
use http::{Method, Request};
use sqlx::SqlitePool;
use tower::ServiceExt;
use unipet::db;
use unipet::resolver::ResolverSettings;
use unipet::routes;
use unipet::state::AppState;

/// Test server that owns an in-memory SQLite pool and full AppState.
/// Each instance is isolated, so tests can run in parallel.
pub struct TestServer {
    pub state: AppState,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::with_settings(ResolverSettings::default()).await
    }

    pub async fn with_settings(slugs: ResolverSettings) -> Self {
        let pool = db::create_pool("sqlite::memory:")
            .await
            .expect("failed to create test pool");

        let state = AppState {
            db: pool,
            slugs,
            public_url: "https://unipet.test".to_string(),
        };

        Self { state }
    }

    /// Returns an Axum Router wired to this server's state for `oneshot()` calls.
    pub fn router(&self) -> axum::Router {
        routes::router(self.state.clone())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.state.db
    }

    /// Send one request through a fresh router and return status + JSON body.
    pub async fn send(&self, request: Request<Body>) -> (http::StatusCode, serde_json::Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        (status, parse_body(response).await)
    }

    /// Create a unit through the API and return its `data` object.
    pub async fn create_unit(&self, name: &str) -> serde_json::Value {
        let (status, body) = self
            .send(json_request(
                Method::POST,
                "/api/network-units",
                &unit_payload(name),
            ))
            .await;
        assert_eq!(status, http::StatusCode::CREATED, "create failed: {body}");
        body["data"].clone()
    }
}

pub fn unit_payload(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "address": "Av. Paulista, 1000",
        "phone": "(11) 3000-0000",
        "services": ["consultas", "vacinas"],
    })
}

// ---------------------------------------------------------------------------
// Request builder helpers
// ---------------------------------------------------------------------------

/// Build a request with no body.
pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Build a request with a JSON body.
pub fn json_request(method: Method, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Parse a response body into a `serde_json::Value`; `Null` for empty or
/// non-JSON bodies.
pub async fn parse_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}
