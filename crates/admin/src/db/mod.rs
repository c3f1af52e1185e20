//! Database operations for the admin service.
//!
//! # Schema: `okazje`
//!
//! The admin service writes catalog data and moderates deals:
//!
//! - `product` - Imported marketplace products, unique per (source, external ID)
//! - `deal` - At most one deal per product; moderation status lives here
//! - `import_profile` - Saved import configurations
//! - `import_run` - Counters of finished import runs
//!
//! Vote aggregates on `deal` are owned by the storefront and never written here.
//!
//! # Migrations
//!
//! Migrations are stored in `migrations/` at the workspace root and run via:
//! ```bash
//! cargo run -p okazje-cli -- migrate
//! ```

pub mod catalog;
pub mod deals;
pub mod import_profiles;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use catalog::PgCatalogStore;
pub use deals::ModerationRepository;
pub use import_profiles::ImportProfileRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation or invalid state transition.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Map unique violations to `Conflict`, everything else to `Database`.
fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

/// Saturating conversion for counters stored as `INTEGER`.
fn to_i32(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_i32_saturates() {
        assert_eq!(to_i32(7), 7);
        assert_eq!(to_i32(u32::MAX), i32::MAX);
    }

    #[test]
    fn test_conflict_on_unique_passes_other_errors() {
        let err = conflict_on_unique(sqlx::Error::RowNotFound, "name taken");
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));
    }
}
