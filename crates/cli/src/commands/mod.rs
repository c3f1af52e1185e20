//! CLI command implementations.

pub mod aliexpress;
pub mod import;
pub mod migrate;

use secrecy::SecretString;

/// Read the database URL, preferring `ADMIN_DATABASE_URL`.
pub(crate) fn database_url() -> Result<SecretString, std::env::VarError> {
    dotenvy::dotenv().ok();

    std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
}
