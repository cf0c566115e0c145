//! Typed repositories over the document store.
//!
//! # Collections
//!
//! - `users` - Profiles keyed by account uid
//! - `products` - Catalog
//! - `orders` - Orders with partner and affiliate attribution
//! - `commissions` - Affiliate commission ledger
//! - `affiliate_clicks` - Append-only click log
//! - `withdrawals` - Partner payout requests
//! - `credentials` - Password hashes for the local identity provider
//!
//! # Migrations
//!
//! When backed by `PostgreSQL`, the `documents` table lives in
//! `crates/storefront/migrations/` and is created via:
//! ```bash
//! cargo run -p moda-brasil-cli -- migrate
//! ```

pub mod clicks;
pub mod commissions;
pub mod credentials;
pub mod orders;
pub mod products;
pub mod users;
pub mod withdrawals;

use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::store::{Document, StoreError};

pub use clicks::ClickRepository;
pub use commissions::CommissionRepository;
pub use credentials::CredentialRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;
pub use withdrawals::WithdrawalRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Document store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Stored document does not match the expected shape.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map store `NotFound` and `Duplicate` to the repository variants.
    fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NotFound,
            StoreError::Duplicate { .. } => Self::Conflict(err.to_string()),
            other => Self::Store(other),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Serialize a model into a document body. The `id` field is never stored.
fn encode<T: Serialize>(value: &T) -> Result<Value, RepositoryError> {
    let mut body = serde_json::to_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("cannot encode document: {e}")))?;
    if let Value::Object(map) = &mut body {
        map.remove("id");
    }
    Ok(body)
}

/// Deserialize a stored document into a model.
fn decode<T: DeserializeOwned>(doc: Document) -> Result<T, RepositoryError> {
    serde_json::from_value(doc.data)
        .map_err(|e| RepositoryError::DataCorruption(format!("document {}: {e}", doc.id)))
}
