//! Database migration command.

use tracing::info;

use autohaus_storefront::db;

use crate::commands::{CommandError, connect};

/// Run the embedded storefront migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    info!("Running migrations...");
    db::MIGRATOR.run(&pool).await?;
    info!("Migrations complete");
    Ok(())
}
