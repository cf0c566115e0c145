//! Catalog and admin maintenance.

use thiserror::Error;
use tracing::instrument;

use moda_brasil_core::{CommissionId, CommissionStatus, Money, ProductId, UserId, UserRole};

use crate::db::{CommissionRepository, ProductRepository, RepositoryError, UserRepository};
use crate::models::{NewProduct, Product, UserProfile};
use crate::store::DocumentStore;

/// Errors from catalog and admin operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Invalid product input.
    #[error("invalid product: {0}")]
    InvalidProduct(String),

    /// Entity does not exist.
    #[error("not found")]
    NotFound,

    /// Commission status change not allowed.
    #[error("cannot move commission from {from} to {to}")]
    InvalidTransition {
        from: CommissionStatus,
        to: CommissionStatus,
    },
}

/// Products shown while the catalog is still empty, also used by `mb-cli seed`.
#[must_use]
pub fn demo_products() -> Vec<(ProductId, Product)> {
    let product = |id: &str, name: &str, description: &str, centavos, sizes: &[&str], color: &str, stock, image: &str| {
        (
            ProductId::new(id),
            Product {
                id: Some(ProductId::new(id)),
                name: name.to_owned(),
                description: description.to_owned(),
                base_price: Money::from_centavos(centavos),
                sizes: sizes.iter().map(|s| (*s).to_owned()).collect(),
                colors: vec![color.to_owned()],
                stock,
                images: vec![image.to_owned()],
            },
        )
    };

    vec![
        product(
            "1",
            "Camiseta Brasil Oficial Amarela",
            "Camiseta torcedor algodão premium.",
            8_990,
            &["P", "M", "G", "GG"],
            "Amarelo",
            100,
            "https://images.unsplash.com/photo-1576566588028-4147f3842f27?w=500&auto=format&fit=crop&q=60",
        ),
        product(
            "2",
            "Boné Aba Reta Verde",
            "Boné estiloso com ajuste traseiro.",
            4_990,
            &["Único"],
            "Verde",
            50,
            "https://images.unsplash.com/photo-1588850561407-ed78c282e89b?w=500&auto=format&fit=crop&q=60",
        ),
        product(
            "3",
            "Agasalho Esportivo Azul",
            "Conjunto completo para treino.",
            22_990,
            &["M", "G"],
            "Azul",
            20,
            "https://images.unsplash.com/photo-1515886657613-9f3515b0c78f?w=500&auto=format&fit=crop&q=60",
        ),
    ]
}

/// Catalog reads and admin maintenance.
pub struct CatalogService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// The catalog. An empty catalog shows the demo products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let products = ProductRepository::new(self.store).list().await?;
        if products.is_empty() {
            return Ok(demo_products().into_iter().map(|(_, p)| p).collect());
        }
        Ok(products)
    }

    /// A product by id, falling back to the demo products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if neither the catalog nor the demo
    /// products have `id`.
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        if let Some(product) = ProductRepository::new(self.store).get(id).await? {
            return Ok(product);
        }
        demo_products()
            .into_iter()
            .find_map(|(demo_id, product)| (&demo_id == id).then_some(product))
            .ok_or(CatalogError::NotFound)
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidProduct` if the name is blank, the price
    /// is not positive or the stock is negative.
    #[instrument(skip_all, fields(name = %input.name))]
    pub async fn add_product(&self, input: NewProduct) -> Result<ProductId, CatalogError> {
        if input.name.trim().is_empty() {
            return Err(CatalogError::InvalidProduct("name is required".to_owned()));
        }
        if !input.base_price.is_positive() {
            return Err(CatalogError::InvalidProduct(
                "price must be positive".to_owned(),
            ));
        }
        if input.stock < 0 {
            return Err(CatalogError::InvalidProduct(
                "stock cannot be negative".to_owned(),
            ));
        }

        let id = ProductRepository::new(self.store)
            .add(&Product::from(input))
            .await?;
        tracing::info!(product_id = %id, "Product added");
        Ok(id)
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), CatalogError> {
        ProductRepository::new(self.store).delete(id).await?;
        tracing::info!("Product deleted");
        Ok(())
    }

    /// Every user profile.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, CatalogError> {
        Ok(UserRepository::new(self.store).list_all().await?)
    }

    /// Storefront partners, for checkout's partner picker.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list_sellers(&self) -> Result<Vec<UserProfile>, CatalogError> {
        Ok(UserRepository::new(self.store)
            .list_by_role(UserRole::Seller)
            .await?)
    }

    /// Delete a user profile.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, uid: &UserId) -> Result<(), CatalogError> {
        UserRepository::new(self.store).delete(uid).await?;
        tracing::info!("User profile deleted");
        Ok(())
    }

    /// Move a commission to `next` if the transition is allowed.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the commission does not exist and
    /// `CatalogError::InvalidTransition` if the move is not allowed.
    #[instrument(skip(self))]
    pub async fn set_commission_status(
        &self,
        id: &CommissionId,
        next: CommissionStatus,
    ) -> Result<(), CatalogError> {
        let commissions = CommissionRepository::new(self.store);
        let current = commissions.get(id).await?.ok_or(CatalogError::NotFound)?;

        if !current.status.can_transition_to(next) {
            return Err(CatalogError::InvalidTransition {
                from: current.status,
                to: next,
            });
        }

        commissions.set_status(id, next).await?;
        tracing::info!(from = %current.status, to = %next, "Commission status changed");
        Ok(())
    }
}
