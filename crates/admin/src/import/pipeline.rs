//! Import run orchestration.

use std::collections::HashSet;

use chrono::Utc;
use tracing::instrument;

use okazje_core::{DealId, DealStatus};

use crate::aliexpress::{MAX_PAGE_SIZE, ProductQuery};
use crate::enrichment::{CATEGORIES, Enricher, EnrichmentError};
use crate::models::{CandidateProduct, ImportProfile};

use super::filter::{self, Eligible};
use super::{CatalogStore, EnrichedProduct, ImportError, ImportReport, ProductFeed, SaveOutcome};

/// Upper bound on pages fetched per run.
const MAX_PAGES: u32 = 20;

/// Outcome of processing one eligible product.
enum Processed {
    Imported(DealId),
    Duplicate,
    BelowQuality,
}

/// Runs import profiles against a feed, an enricher and a store.
pub struct ImportPipeline<'a> {
    feed: &'a dyn ProductFeed,
    enricher: &'a dyn Enricher,
    store: &'a dyn CatalogStore,
}

impl<'a> ImportPipeline<'a> {
    #[must_use]
    pub fn new(
        feed: &'a dyn ProductFeed,
        enricher: &'a dyn Enricher,
        store: &'a dyn CatalogStore,
    ) -> Self {
        Self {
            feed,
            enricher,
            store,
        }
    }

    /// Run one import profile.
    ///
    /// Products are enriched one at a time. A failure on one product is
    /// counted and logged, and the run continues.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Feed` if the first page cannot be fetched.
    #[instrument(skip(self, profile), fields(profile_id = %profile.id, profile = %profile.name))]
    pub async fn run(&self, profile: &ImportProfile) -> Result<ImportReport, ImportError> {
        let started_at = Utc::now();
        let candidates = self.fetch(profile).await?;

        let mut report = ImportReport {
            fetched: count(candidates.len()),
            ..ImportReport::default()
        };

        let status = if profile.auto_approve {
            DealStatus::Approved
        } else {
            DealStatus::Pending
        };

        let mut seen = HashSet::new();
        for candidate in candidates {
            if !seen.insert(candidate.external_id.clone()) {
                report.duplicates += 1;
                continue;
            }

            let eligible = match filter::check(&candidate, profile) {
                Ok(eligible) => eligible,
                Err(reason) => {
                    tracing::debug!(external_id = %candidate.external_id, %reason, "Filtered out");
                    report.filtered_out += 1;
                    continue;
                }
            };

            let external_id = candidate.external_id.clone();
            match self.process(profile, candidate, eligible, status).await {
                Ok(Processed::Imported(deal_id)) => {
                    report.imported += 1;
                    report.deal_ids.push(deal_id);
                }
                Ok(Processed::Duplicate) => report.duplicates += 1,
                Ok(Processed::BelowQuality) => report.below_quality += 1,
                Err(e) => {
                    tracing::warn!(%external_id, error = %e, "Product import failed");
                    report.failed += 1;
                }
            }
        }

        match self.store.record_run(profile.id, started_at, &report).await {
            Ok(run_id) => report.run_id = Some(run_id),
            Err(e) => tracing::error!(error = %e, "Failed to record import run"),
        }

        tracing::info!(
            fetched = report.fetched,
            filtered_out = report.filtered_out,
            below_quality = report.below_quality,
            imported = report.imported,
            duplicates = report.duplicates,
            failed = report.failed,
            "Import run finished"
        );

        Ok(report)
    }

    /// Fetch candidates page by page until `max_items` or the feed runs dry.
    async fn fetch(&self, profile: &ImportProfile) -> Result<Vec<CandidateProduct>, ImportError> {
        let max_items = usize::try_from(profile.max_items.max(1)).unwrap_or(1);
        let page_size = MAX_PAGE_SIZE.min(count(max_items));

        let mut candidates = Vec::with_capacity(max_items);
        for page_no in 1..=MAX_PAGES {
            let query = ProductQuery {
                keywords: profile.keywords.clone(),
                category_ids: profile.category_id.clone(),
                page_no,
                page_size,
                sort: None,
            };

            let page = match self.feed.fetch_page(&query).await {
                Ok(page) => page,
                Err(e) if candidates.is_empty() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(page_no, error = %e, "Stopping pagination after feed error");
                    break;
                }
            };

            let page_len = count(page.raw_count);
            candidates.extend(page.products);

            if candidates.len() >= max_items || page_len < page_size {
                break;
            }
        }

        candidates.truncate(max_items);
        Ok(candidates)
    }

    /// Enrich and store one product that passed the pre-filter.
    async fn process(
        &self,
        profile: &ImportProfile,
        candidate: CandidateProduct,
        eligible: Eligible,
        status: DealStatus,
    ) -> Result<Processed, ProcessError> {
        let source = self.feed.source();
        if self.store.has_deal(source, &candidate.external_id).await? {
            return Ok(Processed::Duplicate);
        }

        let quality = self.enricher.score_quality(&candidate).await?;
        if quality.score < profile.quality_threshold {
            tracing::debug!(
                external_id = %candidate.external_id,
                score = quality.score,
                threshold = profile.quality_threshold,
                "Below quality threshold"
            );
            return Ok(Processed::BelowQuality);
        }

        let normalized_title = self.enricher.normalize_title(&candidate).await?;
        let mapping = self.enricher.map_category(&candidate, CATEGORIES).await?;
        let category = mapping
            .resolve(CATEGORIES, &profile.target_category)
            .to_string();
        let seo = self
            .enricher
            .generate_seo(&candidate, &normalized_title)
            .await?;

        let product = EnrichedProduct {
            source,
            candidate,
            price: eligible.price,
            product_url: eligible.product_url,
            normalized_title,
            category,
            quality_score: quality.score,
            seo,
        };

        Ok(match self.store.save(&product, status).await? {
            SaveOutcome::Created(deal_id) => Processed::Imported(deal_id),
            SaveOutcome::Duplicate => Processed::Duplicate,
        })
    }
}

/// Per-product failure.
#[derive(Debug, thiserror::Error)]
enum ProcessError {
    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),
    #[error(transparent)]
    Store(#[from] crate::db::RepositoryError),
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
