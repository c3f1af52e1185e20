//! Deal domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use okazje_core::{DealId, DealStatus, DealTally, Price, ProductId, VoteDirection};

/// A deal as shown on the storefront.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    /// Unique deal ID.
    pub id: DealId,
    /// Imported product this deal was created from, if any.
    pub product_id: Option<ProductId>,
    pub title: String,
    pub description: Option<String>,
    /// Current price.
    pub price: Price,
    /// Price before the discount, in the same currency.
    pub original_price: Option<Decimal>,
    /// Discount relative to `original_price`, in whole percent.
    pub discount_percent: Option<Decimal>,
    /// Where the deal can be bought.
    pub url: String,
    pub image_url: Option<String>,
    /// Moderation status.
    pub status: DealStatus,
    /// Temperature and vote count.
    #[serde(flatten)]
    pub tally: DealTally,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ordering for deal listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealSort {
    /// Highest temperature first, newest first among equals.
    #[default]
    Hot,
    /// Newest first.
    New,
}

/// Result of a vote transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    /// Deal aggregates after the vote.
    pub tally: DealTally,
    /// The voter's vote after the action.
    pub user_vote: Option<VoteDirection>,
    /// Whether anything was written.
    pub changed: bool,
}
