//! `PostgreSQL` implementation of the import pipeline's catalog store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use okazje_core::{DealId, DealStatus, ImportProfileId, ImportRunId, ProductId, ProductSource};

use super::{RepositoryError, to_i32};
use crate::import::{CatalogStore, EnrichedProduct, ImportReport, SaveOutcome};

/// Catalog store backed by the `okazje` schema.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn has_deal(
        &self,
        source: ProductSource,
        external_id: &str,
    ) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1
                FROM okazje.deal d
                JOIN okazje.product p ON p.id = d.product_id
                WHERE p.source = $1 AND p.external_id = $2
            )
            ",
        )
        .bind(source)
        .bind(external_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Upsert the product by (source, external ID) and create its deal in one
    /// transaction. The partial unique index on `deal.product_id` makes a
    /// concurrent second insert a no-op, reported as `Duplicate`.
    async fn save(
        &self,
        product: &EnrichedProduct,
        status: DealStatus,
    ) -> Result<SaveOutcome, RepositoryError> {
        let candidate = &product.candidate;
        let currency = candidate.currency.code();

        let mut tx = self.pool.begin().await?;

        let product_id = sqlx::query_scalar::<_, ProductId>(
            r"
            INSERT INTO okazje.product (
                source, external_id, title, normalized_title, category, image_url,
                product_url, price, original_price, currency, rating, orders_count,
                quality_score, seo_title, seo_description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (source, external_id) DO UPDATE SET
                title = EXCLUDED.title,
                normalized_title = EXCLUDED.normalized_title,
                category = EXCLUDED.category,
                image_url = EXCLUDED.image_url,
                product_url = EXCLUDED.product_url,
                price = EXCLUDED.price,
                original_price = EXCLUDED.original_price,
                currency = EXCLUDED.currency,
                rating = EXCLUDED.rating,
                orders_count = EXCLUDED.orders_count,
                quality_score = EXCLUDED.quality_score,
                seo_title = EXCLUDED.seo_title,
                seo_description = EXCLUDED.seo_description
            RETURNING id
            ",
        )
        .bind(product.source)
        .bind(&candidate.external_id)
        .bind(&candidate.title)
        .bind(&product.normalized_title)
        .bind(&product.category)
        .bind(&candidate.image_url)
        .bind(&product.product_url)
        .bind(product.price)
        .bind(candidate.original_price)
        .bind(currency)
        .bind(candidate.rating)
        .bind(candidate.orders_count)
        .bind(product.quality_score)
        .bind(&product.seo.title)
        .bind(&product.seo.description)
        .fetch_one(&mut *tx)
        .await?;

        let deal_id = sqlx::query_scalar::<_, DealId>(
            r"
            INSERT INTO okazje.deal (
                product_id, title, description, price, original_price, currency,
                url, image_url, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (product_id) WHERE product_id IS NOT NULL DO NOTHING
            RETURNING id
            ",
        )
        .bind(product_id)
        .bind(&product.normalized_title)
        .bind(&product.seo.description)
        .bind(product.price)
        .bind(candidate.original_price)
        .bind(currency)
        .bind(&product.product_url)
        .bind(&candidate.image_url)
        .bind(status)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(match deal_id {
            Some(id) => {
                tracing::debug!(deal_id = %id, product_id = %product_id, %status, "Deal created");
                SaveOutcome::Created(id)
            }
            None => SaveOutcome::Duplicate,
        })
    }

    async fn record_run(
        &self,
        profile_id: ImportProfileId,
        started_at: DateTime<Utc>,
        report: &ImportReport,
    ) -> Result<ImportRunId, RepositoryError> {
        let id = sqlx::query_scalar::<_, ImportRunId>(
            r"
            INSERT INTO okazje.import_run (
                profile_id, started_at, fetched, filtered_out, below_quality,
                imported, duplicates, failed
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            ",
        )
        .bind(profile_id)
        .bind(started_at)
        .bind(to_i32(report.fetched))
        .bind(to_i32(report.filtered_out))
        .bind(to_i32(report.below_quality))
        .bind(to_i32(report.imported))
        .bind(to_i32(report.duplicates))
        .bind(to_i32(report.failed))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}
