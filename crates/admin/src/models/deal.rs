//! Deals awaiting moderation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use okazje_core::{DealId, DealStatus, ProductId};

/// A deal as shown in the moderation queue.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PendingDeal {
    pub id: DealId,
    pub product_id: Option<ProductId>,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub currency: String,
    pub url: String,
    pub image_url: Option<String>,
    pub status: DealStatus,
    /// Quality score of the linked product, if it was imported.
    pub quality_score: Option<i32>,
    pub created_at: DateTime<Utc>,
}
