//! Bulk import of marketplace products into deals.
//!
//! A run fetches candidates from a [`ProductFeed`], drops the ones that
//! fail the profile thresholds, enriches the rest with an
//! [`Enricher`](crate::enrichment::Enricher) and persists them through a
//! [`CatalogStore`].

pub mod filter;
pub mod pipeline;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use okazje_core::{DealId, DealStatus, ImportProfileId, ImportRunId, ProductSource};

use crate::aliexpress::{AliExpressClient, AliExpressError, ProductPage, ProductQuery};
use crate::db::RepositoryError;
use crate::enrichment::SeoContent;
use crate::models::CandidateProduct;

pub use filter::{Eligible, FilterReason};
pub use pipeline::ImportPipeline;

/// Errors that abort a whole import run.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The marketplace could not be queried at all.
    #[error("feed error: {0}")]
    Feed(#[from] AliExpressError),

    /// Persistence failed outside of per-product handling.
    #[error("store error: {0}")]
    Store(#[from] RepositoryError),
}

/// Source of candidate products.
#[async_trait]
pub trait ProductFeed: Send + Sync {
    /// Marketplace the products come from.
    fn source(&self) -> ProductSource;

    /// Fetch one page of search results.
    ///
    /// `ProductPage::raw_count` drives pagination, so unusable items on a
    /// full page do not end the run.
    async fn fetch_page(&self, query: &ProductQuery) -> Result<ProductPage, AliExpressError>;
}

#[async_trait]
impl ProductFeed for AliExpressClient {
    fn source(&self) -> ProductSource {
        ProductSource::AliExpress
    }

    async fn fetch_page(&self, query: &ProductQuery) -> Result<ProductPage, AliExpressError> {
        self.product_query(query).await
    }
}

/// A product ready to be stored.
#[derive(Debug, Clone)]
pub struct EnrichedProduct {
    pub source: ProductSource,
    pub candidate: CandidateProduct,
    pub price: Decimal,
    pub product_url: String,
    pub normalized_title: String,
    pub category: String,
    pub quality_score: i32,
    pub seo: SeoContent,
}

/// Result of persisting one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Product upserted and a new deal created.
    Created(DealId),
    /// Product already had a deal.
    Duplicate,
}

/// Persistence used by the import pipeline.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Whether a deal already exists for this marketplace product.
    async fn has_deal(&self, source: ProductSource, external_id: &str)
        -> Result<bool, RepositoryError>;

    /// Upsert the product and create its deal with `status`.
    async fn save(
        &self,
        product: &EnrichedProduct,
        status: DealStatus,
    ) -> Result<SaveOutcome, RepositoryError>;

    /// Record a finished run.
    async fn record_run(
        &self,
        profile_id: ImportProfileId,
        started_at: DateTime<Utc>,
        report: &ImportReport,
    ) -> Result<ImportRunId, RepositoryError>;
}

/// Counters for one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Candidates returned by the feed.
    pub fetched: u32,
    /// Dropped by the pre-filter.
    pub filtered_out: u32,
    /// Scored below the profile's quality threshold.
    pub below_quality: u32,
    pub imported: u32,
    /// Already present as a deal.
    pub duplicates: u32,
    /// Enrichment or persistence failed.
    pub failed: u32,
    /// Deals created by this run.
    pub deal_ids: Vec<DealId>,
    /// Stored run record, if it could be written.
    pub run_id: Option<ImportRunId>,
}

impl ImportReport {
    /// Every fetched candidate lands in exactly one bucket.
    #[must_use]
    pub const fn accounted(&self) -> u32 {
        self.filtered_out + self.below_quality + self.imported + self.duplicates + self.failed
    }
}
