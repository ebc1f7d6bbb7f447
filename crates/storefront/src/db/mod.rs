//! Database operations for the storefront `SQLite` database.
//!
//! ## Tables
//!
//! - `cars` / `car_detail` / `car_image` - the catalog aggregate
//! - `users` - accounts (password column holds a one-way hash)
//! - `cards` - stored payment methods, keyed by owning user, encrypted at rest
//! - `orders` / `configuration_options` - purchases and configurator choices
//!
//! # Migrations
//!
//! Migrations are embedded from `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p autohaus-cli -- migrate
//! ```

pub mod cars;
pub mod cards;
pub mod orders;
pub mod seed;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub use cars::CarRepository;
pub use cards::CardRepository;
pub use orders::OrderRepository;
pub use users::UserRepository;

/// Embedded migrations for the storefront schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

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

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool.
///
/// The pool is capped at a single connection: SQLite allows one writer at a
/// time, and a single pooled connection also keeps `sqlite::memory:`
/// databases visible across tasks.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Parse a decimal price stored as TEXT.
pub(crate) fn parse_price(raw: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid price in database: {e}")))
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = create_pool(&secrecy::SecretString::from("sqlite::memory:".to_owned()))
        .await
        .expect("connect to in-memory database");
    MIGRATOR.run(&pool).await.expect("run migrations");
    pool
}
