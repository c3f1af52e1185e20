//! Deal moderation queries.

use sqlx::PgPool;

use okazje_core::{DealId, DealStatus};

use super::RepositoryError;
use crate::models::PendingDeal;

/// Repository for the moderation queue.
pub struct ModerationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ModerationRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Pending deals, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_pending(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PendingDeal>, RepositoryError> {
        let deals = sqlx::query_as::<_, PendingDeal>(
            r"
            SELECT d.id, d.product_id, d.title, d.description, d.price, d.original_price,
                   d.currency, d.url, d.image_url, d.status, p.quality_score, d.created_at
            FROM okazje.deal d
            LEFT JOIN okazje.product p ON p.id = d.product_id
            WHERE d.status = 'pending'
            ORDER BY d.created_at ASC, d.id ASC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(deals)
    }

    /// Move a pending deal to `status`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown deal and
    /// `RepositoryError::Conflict` if the deal is no longer pending.
    pub async fn set_status(&self, id: DealId, status: DealStatus) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, DealStatus>(
            "SELECT status FROM okazje.deal WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if current != DealStatus::Pending {
            return Err(RepositoryError::Conflict(format!("deal is already {current}")));
        }

        sqlx::query("UPDATE okazje.deal SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(deal_id = %id, %status, "Deal moderated");
        Ok(())
    }
}
