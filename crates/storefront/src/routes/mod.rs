//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (database)
//!
//! # Deals
//! GET  /api/deals               - Approved deals (?sort=hot|new&limit=&offset=)
//! GET  /api/deals/{id}          - Approved deal detail
//!
//! # Voting
//! GET  /api/deals/{id}/vote     - Current vote of ?userId=
//! POST /api/deals/{id}/vote     - Cast, switch or remove a vote (rate limited)
//! ```

pub mod deals;
pub mod votes;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::vote_rate_limiter;
use crate::state::AppState;

/// Create the vote routes router. Only casting a vote is rate limited.
pub fn vote_routes() -> Router<AppState> {
    Router::new().route(
        "/{id}/vote",
        post(votes::cast)
            .layer(vote_rate_limiter())
            .get(votes::current),
    )
}

/// Create the deal routes router.
pub fn deal_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(deals::index))
        .route("/{id}", get(deals::show))
        .merge(vote_routes())
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api/deals", deal_routes())
}
