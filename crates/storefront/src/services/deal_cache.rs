//! Cache of deal listing pages.
//!
//! Listing pages are cached using `moka` with a short TTL. Any vote that
//! changes a deal's temperature invalidates every cached page, since hot
//! ordering depends on it.
//!
//! Entries are keyed by a generation number that invalidation bumps. A page
//! loaded while an invalidation happens is stored under the old generation,
//! so later reads miss it and load fresh data.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;

use crate::db::RepositoryError;
use crate::models::{Deal, DealSort};

/// Cache key for a listing page.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct ListingKey {
    pub sort: DealSort,
    pub limit: i64,
    pub offset: i64,
}

/// Shared cache of listing pages.
#[derive(Clone)]
pub struct DealCache {
    pages: Cache<(u64, ListingKey), Arc<Vec<Deal>>>,
    generation: Arc<AtomicU64>,
}

impl DealCache {
    /// Create a cache whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let pages = Cache::builder()
            .max_capacity(500)
            .time_to_live(ttl)
            .build();

        Self {
            pages,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get a cached page, or run `load` and cache its result.
    ///
    /// Concurrent misses on the same page share one load. Errors are not
    /// cached.
    pub async fn get_or_load<F>(
        &self,
        key: ListingKey,
        load: F,
    ) -> Result<Arc<Vec<Deal>>, Arc<RepositoryError>>
    where
        F: Future<Output = Result<Vec<Deal>, RepositoryError>>,
    {
        let generation = self.generation.load(Ordering::Acquire);
        self.pages
            .try_get_with((generation, key), async move { load.await.map(Arc::new) })
            .await
    }

    /// Drop every cached page, including pages still being loaded.
    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.pages.invalidate_all();
    }
}
