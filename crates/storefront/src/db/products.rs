//! Product catalog repository.

use moda_brasil_core::ProductId;

use super::{RepositoryError, decode, encode};
use crate::models::Product;
use crate::store::{Collection, Document, DocumentStore, Filter};

/// Repository for the `products` collection.
pub struct ProductRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Every product, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        self.store
            .list(Collection::Products, &Filter::All)
            .await?
            .into_iter()
            .map(with_id)
            .collect()
    }

    /// A product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the lookup fails.
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        self.store
            .get(Collection::Products, id.as_str())
            .await?
            .map(with_id)
            .transpose()
    }

    /// Insert a product under a generated id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn add(&self, product: &Product) -> Result<ProductId, RepositoryError> {
        let id = self
            .store
            .add(Collection::Products, encode(product)?)
            .await?;
        Ok(ProductId::new(id))
    }

    /// Create or overwrite a product under a known id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn put(&self, id: &ProductId, product: &Product) -> Result<(), RepositoryError> {
        self.store
            .put(Collection::Products, id.as_str(), encode(product)?)
            .await?;
        Ok(())
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the delete fails.
    pub async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        self.store.delete(Collection::Products, id.as_str()).await?;
        Ok(())
    }
}

fn with_id(doc: Document) -> Result<Product, RepositoryError> {
    let id = ProductId::new(doc.id.clone());
    let mut product: Product = decode(doc)?;
    product.id = Some(id);
    Ok(product)
}
