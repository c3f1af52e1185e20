//! Deal repository for database operations.
//!
//! Listing and detail queries only return approved deals. The vote
//! transaction is the only writer of `temperature` and `vote_count`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use okazje_core::{
    CurrencyCode, DealId, DealStatus, DealTally, Price, ProductId, VoteAction, VoteDirection,
    VoteTransition, discount_percent,
};

use super::RepositoryError;
use crate::models::{Deal, DealSort, VoteOutcome};

const DEAL_COLUMNS: &str = "id, product_id, title, description, price, original_price, currency, \
     url, image_url, status, temperature, vote_count, created_at, updated_at";

/// Database row for `okazje.deal`.
#[derive(Debug, sqlx::FromRow)]
struct DealRow {
    id: DealId,
    product_id: Option<ProductId>,
    title: String,
    description: Option<String>,
    price: Decimal,
    original_price: Option<Decimal>,
    currency: String,
    url: String,
    image_url: Option<String>,
    status: DealStatus,
    temperature: i32,
    vote_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DealRow> for Deal {
    type Error = RepositoryError;

    fn try_from(row: DealRow) -> Result<Self, Self::Error> {
        let currency = row.currency.parse::<CurrencyCode>().map_err(|e| {
            RepositoryError::DataCorruption(format!("deal {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            title: row.title,
            description: row.description,
            price: Price::new(row.price, currency),
            original_price: row.original_price,
            discount_percent: discount_percent(row.price, row.original_price),
            url: row.url,
            image_url: row.image_url,
            status: row.status,
            tally: DealTally::new(row.temperature, row.vote_count),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for deal database operations.
pub struct DealRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DealRepository<'a> {
    /// Create a new deal repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List approved deals.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_approved(
        &self,
        sort: DealSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Deal>, RepositoryError> {
        let order_by = match sort {
            DealSort::Hot => "temperature DESC, created_at DESC, id DESC",
            DealSort::New => "created_at DESC, id DESC",
        };
        let sql = format!(
            "SELECT {DEAL_COLUMNS} FROM okazje.deal \
             WHERE status = 'approved' \
             ORDER BY {order_by} \
             LIMIT $1 OFFSET $2"
        );

        let rows = sqlx::query_as::<_, DealRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Deal::try_from).collect()
    }

    /// Get an approved deal by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_approved(&self, id: DealId) -> Result<Option<Deal>, RepositoryError> {
        let sql = format!(
            "SELECT {DEAL_COLUMNS} FROM okazje.deal WHERE id = $1 AND status = 'approved'"
        );

        let row = sqlx::query_as::<_, DealRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(Deal::try_from).transpose()
    }

    /// Get the vote a user holds on a deal.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored direction is invalid.
    pub async fn get_user_vote(
        &self,
        id: DealId,
        user_id: &str,
    ) -> Result<Option<VoteDirection>, RepositoryError> {
        let direction: Option<i16> = sqlx::query_scalar(
            "SELECT direction FROM okazje.deal_vote WHERE deal_id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        direction.map(parse_direction).transpose()
    }

    /// Apply a vote action for a user in a single transaction.
    ///
    /// Concurrent requests for the same (deal, user) pair are serialized with
    /// a transaction-scoped advisory lock. The deal aggregates are changed with
    /// an atomic increment, so votes from different users only contend on the
    /// final row update. Replaying the current vote writes nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the deal does not exist.
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back on drop.
    #[tracing::instrument(skip(self), fields(deal_id = %id))]
    pub async fn apply_vote(
        &self,
        id: DealId,
        user_id: &str,
        action: VoteAction,
    ) -> Result<VoteOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1, hashtext($2))")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let (temperature, vote_count): (i32, i32) =
            sqlx::query_as("SELECT temperature, vote_count FROM okazje.deal WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RepositoryError::NotFound)?;

        let current: Option<i16> = sqlx::query_scalar(
            "SELECT direction FROM okazje.deal_vote WHERE deal_id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        let current = current.map(parse_direction).transpose()?;

        let transition = VoteTransition::plan(current, action);
        if transition.is_noop() {
            tx.commit().await?;
            return Ok(VoteOutcome {
                tally: DealTally::new(temperature, vote_count),
                user_vote: transition.next,
                changed: false,
            });
        }

        match transition.next {
            Some(direction) => {
                sqlx::query(
                    "INSERT INTO okazje.deal_vote (deal_id, user_id, direction) \
                     VALUES ($1, $2, $3) \
                     ON CONFLICT (deal_id, user_id) \
                     DO UPDATE SET direction = EXCLUDED.direction, updated_at = NOW()",
                )
                .bind(id)
                .bind(user_id)
                .bind(direction.value())
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query("DELETE FROM okazje.deal_vote WHERE deal_id = $1 AND user_id = $2")
                    .bind(id)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let (temperature, vote_count): (i32, i32) = sqlx::query_as(
            "UPDATE okazje.deal \
             SET temperature = temperature + $2, vote_count = vote_count + $2 \
             WHERE id = $1 \
             RETURNING temperature, vote_count",
        )
        .bind(id)
        .bind(transition.delta)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;

        tracing::debug!(
            delta = transition.delta,
            temperature,
            vote_count,
            "Vote applied"
        );

        Ok(VoteOutcome {
            tally: DealTally::new(temperature, vote_count),
            user_vote: transition.next,
            changed: true,
        })
    }
}

fn parse_direction(value: i16) -> Result<VoteDirection, RepositoryError> {
    VoteDirection::from_value(value)
        .ok_or_else(|| RepositoryError::DataCorruption(format!("invalid vote direction: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(currency: &str) -> DealRow {
        let now = Utc::now();
        DealRow {
            id: DealId::new(1),
            product_id: Some(ProductId::new(9)),
            title: "Słuchawki".to_string(),
            description: Some("ANC".to_string()),
            price: Decimal::new(14999, 2),
            original_price: Some(Decimal::new(29999, 2)),
            currency: currency.to_string(),
            url: "https://example.com".to_string(),
            image_url: None,
            status: DealStatus::Approved,
            temperature: 5,
            vote_count: 6,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_row_converts_to_deal() {
        let deal = Deal::try_from(row("PLN")).expect("valid row");
        assert_eq!(deal.price.currency_code, CurrencyCode::PLN);
        assert_eq!(deal.tally, DealTally::new(5, 6));
        assert_eq!(deal.discount_percent, Some(Decimal::new(50, 0)));
    }

    #[test]
    fn test_row_with_unknown_currency_is_corrupt() {
        let result = Deal::try_from(row("XYZ"));
        assert!(matches!(result, Err(RepositoryError::DataCorruption(_))));
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!(parse_direction(1).ok(), Some(VoteDirection::Up));
        assert_eq!(parse_direction(-1).ok(), Some(VoteDirection::Down));
        assert!(matches!(
            parse_direction(3),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
