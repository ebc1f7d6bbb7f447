//! Catalog seeding command.

use tracing::info;

use autohaus_storefront::db::seed::seed_catalog;

use crate::commands::{CommandError, connect};

/// Seed the catalog with the demo fleet. Skips when cars already exist.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    info!("Seeding catalog...");
    seed_catalog(&pool).await?;
    info!("Seeding complete");
    Ok(())
}
