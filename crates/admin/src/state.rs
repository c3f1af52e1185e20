//! Application state shared across handlers.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use sqlx::PgPool;
use tokio::task::JoinHandle;

use okazje_core::ImportProfileId;

use crate::aliexpress::AliExpressClient;
use crate::config::AdminConfig;
use crate::db::PgCatalogStore;
use crate::enrichment::Enricher;
use crate::import::{ImportError, ImportPipeline, ImportReport};
use crate::models::ImportProfile;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the database pool and the external clients used by imports.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    aliexpress: AliExpressClient,
    enricher: Arc<dyn Enricher>,
    catalog: PgCatalogStore,
    running_imports: Mutex<HashSet<ImportProfileId>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        config: AdminConfig,
        pool: PgPool,
        aliexpress: AliExpressClient,
        enricher: Arc<dyn Enricher>,
    ) -> Self {
        let catalog = PgCatalogStore::new(pool.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                aliexpress,
                enricher,
                catalog,
                running_imports: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the AliExpress client.
    #[must_use]
    pub fn aliexpress(&self) -> &AliExpressClient {
        &self.inner.aliexpress
    }

    /// Get a reference to the product enricher.
    #[must_use]
    pub fn enricher(&self) -> &dyn Enricher {
        self.inner.enricher.as_ref()
    }

    /// Get a reference to the catalog store.
    #[must_use]
    pub fn catalog(&self) -> &PgCatalogStore {
        &self.inner.catalog
    }

    /// Mark a profile as running. Returns `None` if it already is.
    ///
    /// The mark is cleared when the returned guard is dropped.
    #[must_use]
    pub fn begin_import(&self, profile_id: ImportProfileId) -> Option<ImportGuard> {
        let mut running = self
            .inner
            .running_imports
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        running.insert(profile_id).then(|| ImportGuard {
            state: self.clone(),
            profile_id,
        })
    }

    /// Start an import run on its own task. Returns `None` if the profile
    /// is already running.
    ///
    /// The run holds the profile's [`ImportGuard`] and keeps going when the
    /// returned handle is dropped, so a caller that goes away does not cut
    /// a run short between pages or saves.
    #[must_use]
    pub fn spawn_import(
        &self,
        profile: ImportProfile,
    ) -> Option<JoinHandle<Result<ImportReport, ImportError>>> {
        let guard = self.begin_import(profile.id)?;
        let state = self.clone();

        Some(tokio::spawn(async move {
            let _guard = guard;
            ImportPipeline::new(state.aliexpress(), state.enricher(), state.catalog())
                .run(&profile)
                .await
        }))
    }
}

/// Marks an import profile as running for its lifetime.
pub struct ImportGuard {
    state: AppState,
    profile_id: ImportProfileId,
}

impl Drop for ImportGuard {
    fn drop(&mut self) {
        self.state
            .inner
            .running_imports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.profile_id);
    }
}
