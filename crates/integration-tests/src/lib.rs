//! Integration tests for Autohaus.
//!
//! Each test runs against a fresh in-memory `SQLite` database with the
//! storefront migrations applied.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p autohaus-integration-tests
//! ```

use secrecy::SecretString;
use sqlx::SqlitePool;

use autohaus_storefront::db;

/// A migrated in-memory database for one test.
///
/// # Panics
///
/// Panics if the database cannot be created or migrated; tests cannot
/// proceed without it.
pub async fn test_pool() -> SqlitePool {
    let pool = db::create_pool(&SecretString::from("sqlite::memory:".to_owned()))
        .await
        .expect("connect to in-memory database");
    db::MIGRATOR.run(&pool).await.expect("run migrations");
    pool
}
