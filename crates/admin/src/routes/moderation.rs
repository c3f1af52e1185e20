//! Deal moderation handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use okazje_core::{DealId, DealStatus};

use crate::db::ModerationRepository;
use crate::error::{AppError, Result};
use crate::models::PendingDeal;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

/// Paging for the moderation queue.
#[derive(Debug, Default, Deserialize)]
pub struct PendingQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PendingQuery {
    fn bounds(&self) -> (i64, i64) {
        (
            self.limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            self.offset.unwrap_or(0).max(0),
        )
    }
}

/// Moderation result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationResponse {
    pub success: bool,
    pub id: DealId,
    pub status: DealStatus,
}

fn parse_deal_id(raw: &str) -> Result<DealId> {
    raw.parse::<DealId>()
        .map_err(|_| AppError::NotFound("Deal".to_string()))
}

/// List pending deals.
pub async fn pending(
    State(state): State<AppState>,
    Query(query): Query<PendingQuery>,
) -> Result<Json<Vec<PendingDeal>>> {
    let (limit, offset) = query.bounds();
    let deals = ModerationRepository::new(state.pool())
        .list_pending(limit, offset)
        .await?;
    Ok(Json(deals))
}

/// Approve a pending deal.
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ModerationResponse>> {
    moderate(&state, &id, DealStatus::Approved).await
}

/// Reject a pending deal.
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ModerationResponse>> {
    moderate(&state, &id, DealStatus::Rejected).await
}

async fn moderate(state: &AppState, raw_id: &str, status: DealStatus) -> Result<Json<ModerationResponse>> {
    let id = parse_deal_id(raw_id)?;
    ModerationRepository::new(state.pool())
        .set_status(id, status)
        .await?;

    Ok(Json(ModerationResponse {
        success: true,
        id,
        status,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_query_bounds() {
        assert_eq!(PendingQuery::default().bounds(), (DEFAULT_PAGE_SIZE, 0));

        let query = PendingQuery {
            limit: Some(10_000),
            offset: Some(-5),
        };
        assert_eq!(query.bounds(), (MAX_PAGE_SIZE, 0));
    }

    #[test]
    fn test_moderation_response_shape() {
        let response = ModerationResponse {
            success: true,
            id: DealId::new(9),
            status: DealStatus::Approved,
        };
        assert_eq!(
            serde_json::to_value(&response).expect("serialize"),
            serde_json::json!({"success": true, "id": 9, "status": "approved"})
        );
    }

    #[test]
    fn test_parse_deal_id_rejects_garbage() {
        assert!(matches!(parse_deal_id("x1"), Err(AppError::NotFound(_))));
    }
}
