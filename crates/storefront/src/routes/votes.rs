//! Deal vote handlers.
//!
//! `POST /api/deals/{id}/vote` with `{ "action": "up"|"down"|"remove", "userId": "..." }`.
//! Success returns `{ success, temperature, voteCount, userVote }`; failures use
//! the shared `{ success: false, message }` shape with 404 for unknown deals,
//! 400 for malformed requests and 500 for anything else.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use okazje_core::{VoteAction, VoteDirection};

use super::deals::parse_deal_id;
use crate::db::{DealRepository, RepositoryError};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::VoteOutcome;
use crate::state::AppState;

const MAX_USER_ID_LENGTH: usize = 128;

/// Vote request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub action: VoteAction,
    pub user_id: String,
}

/// Vote response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub success: bool,
    pub temperature: i32,
    pub vote_count: i32,
    pub user_vote: Option<VoteDirection>,
}

impl From<VoteOutcome> for VoteResponse {
    fn from(outcome: VoteOutcome) -> Self {
        Self {
            success: true,
            temperature: outcome.tally.temperature,
            vote_count: outcome.tally.vote_count,
            user_vote: outcome.user_vote,
        }
    }
}

/// Query for reading a user's current vote.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentVoteQuery {
    pub user_id: String,
}

/// Current vote response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentVoteResponse {
    pub success: bool,
    pub user_vote: Option<VoteDirection>,
}

/// Validate and normalize a voter ID.
fn validate_user_id(raw: &str) -> Result<&str> {
    let user_id = raw.trim();
    if user_id.is_empty() {
        return Err(AppError::BadRequest("userId is required".to_string()));
    }
    if user_id.len() > MAX_USER_ID_LENGTH {
        return Err(AppError::BadRequest("userId is too long".to_string()));
    }
    Ok(user_id)
}

/// Map repository failures for a specific deal.
fn deal_error(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("Deal".to_string()),
        other => AppError::Database(other),
    }
}

/// Cast, switch or remove a vote.
pub async fn cast(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<VoteRequest>, JsonRejection>,
) -> Result<Json<VoteResponse>> {
    let Json(request) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let id = parse_deal_id(&id)?;
    let user_id = validate_user_id(&request.user_id)?;

    let outcome = DealRepository::new(state.pool())
        .apply_vote(id, user_id, request.action)
        .await
        .map_err(deal_error)?;

    if outcome.changed {
        state.deal_cache().invalidate_all();
        let deal_id = id.to_string();
        add_breadcrumb("vote", "Vote applied", Some(&[("deal_id", deal_id.as_str())]));
    }

    tracing::info!(
        deal_id = %id,
        action = ?request.action,
        changed = outcome.changed,
        temperature = outcome.tally.temperature,
        "Vote processed"
    );

    Ok(Json(outcome.into()))
}

/// Read the caller's current vote on a deal.
pub async fn current(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<CurrentVoteQuery>,
) -> Result<Json<CurrentVoteResponse>> {
    let id = parse_deal_id(&id)?;
    let user_id = validate_user_id(&query.user_id)?;

    let user_vote = DealRepository::new(state.pool())
        .get_user_vote(id, user_id)
        .await
        .map_err(deal_error)?;

    Ok(Json(CurrentVoteResponse {
        success: true,
        user_vote,
    }))
}
