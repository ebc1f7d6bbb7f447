//! CLI command implementations.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::SqlitePool;
use thiserror::Error;

use autohaus_storefront::db;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("AUTOHAUS_DATABASE_URL not set")]
    MissingDatabaseUrl,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("repository error: {0}")]
    Repository(#[from] db::RepositoryError),
}

/// Connect to the database named by `AUTOHAUS_DATABASE_URL`.
pub async fn connect() -> Result<SqlitePool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("AUTOHAUS_DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingDatabaseUrl)?;

    Ok(db::create_pool(&database_url).await?)
}
