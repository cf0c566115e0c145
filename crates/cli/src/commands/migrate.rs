//! Database migration command.
//!
//! Creates `storefront.documents` (from `crates/storefront/migrations/`) and
//! the tower-sessions table. The server never migrates on startup.

use moda_brasil_storefront::store::PgDocumentStore;
use tower_sessions_sqlx_store::PostgresStore;

use super::{CommandError, connect};

/// Run all storefront migrations.
///
/// # Errors
///
/// Returns `CommandError` if the connection or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running document store migrations...");
    PgDocumentStore::new(pool.clone()).migrate().await?;

    tracing::info!("Running session store migrations...");
    PostgresStore::new(pool)
        .migrate()
        .await
        .map_err(|e| CommandError::Sessions(e.to_string()))?;

    tracing::info!("Migrations complete!");
    Ok(())
}
