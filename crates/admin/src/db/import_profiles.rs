//! Import profile repository.

use sqlx::PgPool;

use okazje_core::ImportProfileId;

use super::{RepositoryError, conflict_on_unique};
use crate::models::{CreateImportProfileInput, ImportProfile, ImportRun};

const PROFILE_COLUMNS: &str = "id, name, keywords, category_id, target_category, min_rating, \
     min_discount_percent, max_items, quality_threshold, auto_approve, created_at, updated_at";

/// Repository for import profiles and their runs.
pub struct ImportProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ImportProfileRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all profiles by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ImportProfile>, RepositoryError> {
        let query = format!("SELECT {PROFILE_COLUMNS} FROM okazje.import_profile ORDER BY name");
        let profiles = sqlx::query_as::<_, ImportProfile>(&query)
            .fetch_all(self.pool)
            .await?;
        Ok(profiles)
    }

    /// Get a profile by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no profile has this ID.
    pub async fn get(&self, id: ImportProfileId) -> Result<ImportProfile, RepositoryError> {
        let query = format!("SELECT {PROFILE_COLUMNS} FROM okazje.import_profile WHERE id = $1");
        sqlx::query_as::<_, ImportProfile>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Create a profile. Input must already be normalized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(
        &self,
        input: &CreateImportProfileInput,
    ) -> Result<ImportProfile, RepositoryError> {
        let query = format!(
            "INSERT INTO okazje.import_profile (
                name, keywords, category_id, target_category, min_rating,
                min_discount_percent, max_items, quality_threshold, auto_approve
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PROFILE_COLUMNS}"
        );

        sqlx::query_as::<_, ImportProfile>(&query)
            .bind(&input.name)
            .bind(&input.keywords)
            .bind(&input.category_id)
            .bind(&input.target_category)
            .bind(input.min_rating)
            .bind(input.min_discount_percent)
            .bind(input.max_items)
            .bind(input.quality_threshold)
            .bind(input.auto_approve)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "profile name already exists"))
    }

    /// Delete a profile and its run history.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no profile has this ID.
    pub async fn delete(&self, id: ImportProfileId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM okazje.import_profile WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Most recent runs of a profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent_runs(
        &self,
        id: ImportProfileId,
        limit: i64,
    ) -> Result<Vec<ImportRun>, RepositoryError> {
        let runs = sqlx::query_as::<_, ImportRun>(
            r"
            SELECT id, profile_id, started_at, finished_at, fetched, filtered_out,
                   below_quality, imported, duplicates, failed
            FROM okazje.import_run
            WHERE profile_id = $1
            ORDER BY started_at DESC
            LIMIT $2
            ",
        )
        .bind(id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(runs)
    }
}
