//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness check
//! GET    /health/ready                    - Readiness check (database)
//!
//! # Import profiles
//! GET    /api/import-profiles             - List profiles
//! POST   /api/import-profiles             - Create profile
//! GET    /api/import-profiles/{id}        - Profile with recent runs
//! DELETE /api/import-profiles/{id}        - Delete profile
//! POST   /api/import-profiles/{id}/run    - Run an import now
//!
//! # Moderation
//! GET    /api/deals/pending               - Pending deals (?limit=&offset=)
//! POST   /api/deals/{id}/approve          - Publish a pending deal
//! POST   /api/deals/{id}/reject           - Reject a pending deal
//! ```
//!
//! All `/api` routes require `Authorization: Bearer <ADMIN_API_TOKEN>` when
//! the token is configured.

pub mod import_profiles;
pub mod moderation;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::require_api_token;
use crate::state::AppState;

/// Create the import profile routes router.
pub fn import_profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(import_profiles::index).post(import_profiles::create),
        )
        .route(
            "/{id}",
            get(import_profiles::show).delete(import_profiles::destroy),
        )
        .route("/{id}/run", post(import_profiles::run))
}

/// Create the moderation routes router.
pub fn moderation_routes() -> Router<AppState> {
    Router::new()
        .route("/pending", get(moderation::pending))
        .route("/{id}/approve", post(moderation::approve))
        .route("/{id}/reject", post(moderation::reject))
}

/// Create all API routes for admin.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/api/import-profiles", import_profile_routes())
        .nest("/api/deals", moderation_routes())
        .layer(axum::middleware::from_fn_with_state(
            state,
            require_api_token,
        ))
}
