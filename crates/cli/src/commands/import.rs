//! Import commands.
//!
//! Runs the same pipeline as `POST /api/import-profiles/{id}/run` without
//! the admin service. Concurrent runs of one profile are not coordinated
//! with a running admin process.

use okazje_admin::aliexpress::{AliExpressClient, AliExpressError};
use okazje_admin::claude::{ClaudeClient, ClaudeError};
use okazje_admin::config::{AliExpressConfig, ClaudeConfig, ConfigError};
use okazje_admin::db::{self, ImportProfileRepository, PgCatalogStore, RepositoryError};
use okazje_admin::enrichment::ClaudeEnricher;
use okazje_admin::import::{ImportError, ImportPipeline};
use okazje_core::ImportProfileId;

/// Import command errors.
#[derive(Debug, thiserror::Error)]
pub enum ImportCommandError {
    #[error("Missing environment variable: DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    AliExpress(#[from] AliExpressError),

    #[error(transparent)]
    Claude(#[from] ClaudeError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Failed to render report: {0}")]
    Render(#[from] serde_json::Error),
}

async fn connect() -> Result<sqlx::PgPool, ImportCommandError> {
    let database_url = super::database_url().map_err(|_| ImportCommandError::MissingDatabaseUrl)?;
    Ok(db::create_pool(&database_url).await?)
}

/// Print all import profiles.
pub async fn list_profiles() -> Result<(), ImportCommandError> {
    let pool = connect().await?;
    let profiles = ImportProfileRepository::new(&pool).list().await?;

    #[allow(clippy::print_stdout)]
    {
        for profile in &profiles {
            println!(
                "{:>4}  {:<24}  {:<32}  -> {}{}",
                profile.id.as_i32(),
                profile.name,
                profile.keywords,
                profile.target_category,
                if profile.auto_approve { " (auto)" } else { "" }
            );
        }
    }
    Ok(())
}

/// Run an import profile and print its report as JSON.
pub async fn run_profile(profile_id: i32) -> Result<(), ImportCommandError> {
    let pool = connect().await?;
    let profile = ImportProfileRepository::new(&pool)
        .get(ImportProfileId::new(profile_id))
        .await?;

    let feed = AliExpressClient::new(AliExpressConfig::from_env()?)?;
    let enricher = ClaudeEnricher::new(ClaudeClient::new(&ClaudeConfig::from_env()?)?);
    let store = PgCatalogStore::new(pool);

    tracing::info!(profile = %profile.name, "Starting import");
    let report = ImportPipeline::new(&feed, &enricher, &store)
        .run(&profile)
        .await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
