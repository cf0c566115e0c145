//! Seed commands.

use moda_brasil_storefront::db::ProductRepository;
use moda_brasil_storefront::services::demo_products;
use moda_brasil_storefront::store::PgDocumentStore;

use super::{CommandError, connect};

/// Write the demo products under their fixed ids.
///
/// Re-running overwrites them in place, so the command is idempotent.
///
/// # Errors
///
/// Returns `CommandError` if the connection or a write fails.
pub async fn products() -> Result<(), CommandError> {
    let store = PgDocumentStore::new(connect().await?);
    let repo = ProductRepository::new(&store);

    let products = demo_products();
    for (id, product) in &products {
        repo.put(id, product).await?;
        tracing::info!(product_id = %id, name = %product.name, "Seeded product");
    }

    tracing::info!(count = products.len(), "Product seed complete!");
    Ok(())
}
