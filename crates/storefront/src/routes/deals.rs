//! Deal listing and detail handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use okazje_core::DealId;

use crate::db::DealRepository;
use crate::error::{AppError, Result};
use crate::models::{Deal, DealSort};
use crate::services::ListingKey;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters for the deal listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListDealsQuery {
    #[serde(default)]
    pub sort: DealSort,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListDealsQuery {
    /// Normalize paging into a cache key (limit clamped to 1..=100, offset >= 0).
    #[must_use]
    pub fn listing_key(&self) -> ListingKey {
        ListingKey {
            sort: self.sort,
            limit: self
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            offset: self.offset.unwrap_or(0).max(0),
        }
    }
}

/// Parse a deal ID from the path. Unparseable IDs cannot exist, so they are
/// reported as not found.
pub(crate) fn parse_deal_id(raw: &str) -> Result<DealId> {
    raw.parse::<DealId>()
        .map_err(|_| AppError::NotFound("Deal".to_string()))
}

/// List approved deals.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListDealsQuery>,
) -> Result<Json<Vec<Deal>>> {
    let key = query.listing_key();
    let repo = DealRepository::new(state.pool());

    let deals = state
        .deal_cache()
        .get_or_load(key, repo.list_approved(key.sort, key.limit, key.offset))
        .await
        .map_err(|e| AppError::Internal(format!("listing deals: {e}")))?;

    Ok(Json(deals.as_ref().clone()))
}

/// Show an approved deal.
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Deal>> {
    let id = parse_deal_id(&id)?;

    DealRepository::new(state.pool())
        .get_approved(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Deal".to_string()))
}
