//! Okazje+ Admin library.
//!
//! Catalog imports from AliExpress with Claude enrichment, and the
//! moderation queue for imported deals.
//!
//! # Security
//!
//! This crate holds the AliExpress app secret and the Anthropic API key.
//! Bind it to a private interface and set `ADMIN_API_TOKEN` when the
//! network is shared.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod aliexpress;
pub mod claude;
pub mod config;
pub mod db;
pub mod enrichment;
pub mod error;
pub mod import;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the admin router. Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, header::AUTHORIZATION};
    use secrecy::SecretString;
    use tower::ServiceExt;

    use okazje_core::{CurrencyCode, ImportProfileId};

    use super::*;
    use crate::aliexpress::AliExpressClient;
    use crate::config::{AdminConfig, AliExpressConfig, ClaudeConfig};
    use crate::enrichment::{
        CategoryMapping, Enricher, EnrichmentError, QualityScore, SeoContent,
    };
    use crate::models::{CandidateProduct, ImportProfile};

    const TOKEN: &str = "admin-token-0123456789abcdef-XYZ-7";

    struct UnusedEnricher;

    #[async_trait]
    impl Enricher for UnusedEnricher {
        async fn score_quality(
            &self,
            _: &CandidateProduct,
        ) -> Result<QualityScore, EnrichmentError> {
            Err(EnrichmentError::MissingJson)
        }

        async fn normalize_title(&self, _: &CandidateProduct) -> Result<String, EnrichmentError> {
            Err(EnrichmentError::MissingJson)
        }

        async fn map_category(
            &self,
            _: &CandidateProduct,
            _: &[&str],
        ) -> Result<CategoryMapping, EnrichmentError> {
            Err(EnrichmentError::MissingJson)
        }

        async fn generate_seo(
            &self,
            _: &CandidateProduct,
            _: &str,
        ) -> Result<SeoContent, EnrichmentError> {
            Err(EnrichmentError::MissingJson)
        }
    }

    fn test_state(api_token: Option<&str>) -> AppState {
        let aliexpress = AliExpressConfig {
            app_key: "12345".to_string(),
            app_secret: SecretString::from("unused-secret"),
            api_url: "http://127.0.0.1:9/sync".to_string(),
            tracking_id: None,
            target_currency: CurrencyCode::PLN,
            target_language: "PL".to_string(),
        };
        let config = AdminConfig {
            database_url: SecretString::from("postgres://localhost/okazje_test"),
            host: [127, 0, 0, 1].into(),
            port: 3001,
            api_token: api_token.map(SecretString::from),
            aliexpress: aliexpress.clone(),
            claude: ClaudeConfig {
                api_key: SecretString::from("unused"),
                model: "test-model".to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/okazje_test")
            .expect("lazy pool");
        let client = AliExpressClient::new(aliexpress).expect("client");

        AppState::new(config, pool, client, Arc::new(UnusedEnricher))
    }

    #[tokio::test]
    async fn test_health_skips_auth() {
        let response = app(test_state(Some(TOKEN)))
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_requires_token_when_configured() {
        let response = app(test_state(Some(TOKEN)))
            .oneshot(
                Request::get("/api/deals/pending")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(test_state(Some(TOKEN)))
            .oneshot(
                Request::get("/api/deals/pending")
                    .header(AUTHORIZATION, "Bearer wrong-token")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_profile_body_is_bad_request() {
        let response = app(test_state(None))
            .oneshot(
                Request::post("/api/import-profiles")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name": 5}"#))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    fn import_profile(id: i32) -> ImportProfile {
        let now = chrono::Utc::now();
        ImportProfile {
            id: ImportProfileId::new(id),
            name: "Lampki".to_string(),
            keywords: "bike light".to_string(),
            category_id: None,
            target_category: "Sport i turystyka".to_string(),
            min_rating: 4.0,
            min_discount_percent: 20,
            max_items: 10,
            quality_threshold: 60,
            auto_approve: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_spawned_import_blocks_overlap_until_it_finishes() {
        let state = test_state(None);
        let id = ImportProfileId::new(41);

        let handle = state.spawn_import(import_profile(41)).expect("first run starts");
        assert!(state.spawn_import(import_profile(41)).is_none());
        assert!(state.begin_import(id).is_none());

        // The gateway address refuses connections, so the run fails on page 1.
        let result = handle.await.expect("task joins");
        assert!(matches!(result, Err(crate::import::ImportError::Feed(_))));
        assert!(state.begin_import(id).is_some());
    }

    #[tokio::test]
    async fn test_spawned_import_outlives_dropped_handle() {
        let state = test_state(None);
        let id = ImportProfileId::new(42);

        drop(state.spawn_import(import_profile(42)).expect("run starts"));
        assert!(state.begin_import(id).is_none());

        // The detached run still completes and releases the profile.
        tokio::time::timeout(std::time::Duration::from_secs(30), async {
            loop {
                if state.begin_import(id).is_some() {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("run finishes after its handle is dropped");
    }

    #[tokio::test]
    async fn test_run_rejects_non_numeric_profile() {
        let response = app(test_state(None))
            .oneshot(
                Request::post("/api/import-profiles/abc/run")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
