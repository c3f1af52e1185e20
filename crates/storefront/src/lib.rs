//! Okazje+ Storefront library.
//!
//! This crate provides the public deals API as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the storefront router with health checks, API routes and
/// request-scoped middleware. Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<axum::body::Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            },
        ))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, header::CONTENT_TYPE, header::RETRY_AFTER};
    use secrecy::SecretString;
    use tower::ServiceExt;

    use super::*;
    use crate::config::StorefrontConfig;

    const CLIENT: &str = "203.0.113.9";

    fn test_app() -> Router {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/okazje_test"),
            host: [127, 0, 0, 1].into(),
            port: 3000,
            listing_cache_ttl: Duration::from_secs(30),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/okazje_test")
            .expect("lazy pool");
        app(AppState::new(config, pool))
    }

    /// A vote with a malformed body, rejected before touching the database.
    fn bad_vote() -> Request<Body> {
        Request::post("/api/deals/1/vote")
            .header("x-forwarded-for", CLIENT)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{"))
            .expect("request")
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn test_health_is_ok() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_vote_burst_then_json_429() {
        let app = test_app();

        for _ in 0..10 {
            let response = app.clone().oneshot(bad_vote()).await.expect("response");
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        let response = app.clone().oneshot(bad_vote()).await.expect("response");
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(RETRY_AFTER));
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Rate limited");
    }

    #[tokio::test]
    async fn test_reading_current_vote_is_not_rate_limited() {
        let app = test_app();

        for _ in 0..15 {
            let response = app
                .clone()
                .oneshot(
                    Request::get("/api/deals/abc/vote?userId=u1")
                        .header("x-forwarded-for", CLIENT)
                        .body(Body::empty())
                        .expect("request"),
                )
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_limit_is_per_client_address() {
        let app = test_app();

        for _ in 0..11 {
            app.clone().oneshot(bad_vote()).await.expect("response");
        }

        let other_client = Request::post("/api/deals/1/vote")
            .header("x-forwarded-for", "198.51.100.20")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{"))
            .expect("request");
        let response = app.oneshot(other_client).await.expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
