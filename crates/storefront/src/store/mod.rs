//! Document-store capability.
//!
//! Every entity lives in a collection of JSON documents addressed by an
//! opaque string id. Repositories (`crate::db`) only talk to this trait, so
//! the backing store can be swapped:
//!
//! - [`MemoryStore`] - in-process, used for local development and tests
//! - [`PgDocumentStore`] - a single `documents` JSONB table in `PostgreSQL`
//!
//! # Semantics
//!
//! - `list` returns matching documents in insertion order, so "first match
//!   wins" lookups are deterministic.
//! - `put` overwrites the whole document; `patch` merges top-level fields
//!   into an existing document and fails with [`StoreError::NotFound`] if it
//!   does not exist.
//! - `delete` is idempotent.
//! - A collection with a [`Collection::unique_field`] rejects a second
//!   document carrying the same value with [`StoreError::Duplicate`].

mod memory;
mod postgres;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

/// Named collections in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Products,
    Orders,
    Commissions,
    AffiliateClicks,
    Withdrawals,
    /// Password hashes owned by the local identity provider.
    Credentials,
}

impl Collection {
    /// Collection name as stored.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Products => "products",
            Self::Orders => "orders",
            Self::Commissions => "commissions",
            Self::AffiliateClicks => "affiliate_clicks",
            Self::Withdrawals => "withdrawals",
            Self::Credentials => "credentials",
        }
    }
}

impl Collection {
    /// Top-level field whose value must be unique within the collection.
    #[must_use]
    pub const fn unique_field(&self) -> Option<&'static str> {
        match self {
            Self::Credentials => Some("email"),
            _ => None,
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query filter for [`DocumentStore::list`].
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document in the collection.
    All,
    /// Documents whose top-level `field` equals `value`.
    Eq { field: String, value: Value },
}

impl Filter {
    /// Equality filter on a top-level field.
    #[must_use]
    pub fn field_eq(field: &str, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.to_owned(),
            value: value.into(),
        }
    }

    /// Whether a document body satisfies this filter.
    #[must_use]
    pub fn matches(&self, data: &Value) -> bool {
        match self {
            Self::All => true,
            Self::Eq { field, value } => data.get(field) == Some(value),
        }
    }
}

/// A stored document and its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// Errors returned by a [`DocumentStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Patch target does not exist.
    #[error("document {collection}/{id} not found")]
    NotFound {
        collection: Collection,
        id: String,
    },

    /// Another document already holds the collection's unique field value.
    #[error("duplicate {field} in {collection}")]
    Duplicate {
        collection: Collection,
        field: &'static str,
    },

    /// Document bodies must be JSON objects.
    #[error("document body must be a JSON object")]
    NotAnObject,
}

/// Capability interface over a hosted or local document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents in `collection` matching `filter`, in insertion order.
    async fn list(&self, collection: Collection, filter: &Filter)
    -> Result<Vec<Document>, StoreError>;

    /// A single document by id.
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create or fully overwrite the document at `id`.
    async fn put(&self, collection: Collection, id: &str, data: Value) -> Result<(), StoreError>;

    /// Insert a new document under a generated id and return the id.
    async fn add(&self, collection: Collection, data: Value) -> Result<String, StoreError>;

    /// Merge top-level `fields` into an existing document.
    async fn patch(&self, collection: Collection, id: &str, fields: Value)
    -> Result<(), StoreError>;

    /// Remove a document. Missing documents are not an error.
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Generate a new document id.
pub(crate) fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Reject anything other than a JSON object.
pub(crate) fn ensure_object(data: &Value) -> Result<(), StoreError> {
    if data.is_object() {
        Ok(())
    } else {
        Err(StoreError::NotAnObject)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_filter_matches_top_level_field() {
        let doc = json!({"affiliateCode": "ANA1234", "role": "customer"});
        assert!(Filter::All.matches(&doc));
        assert!(Filter::field_eq("affiliateCode", "ANA1234").matches(&doc));
        assert!(!Filter::field_eq("affiliateCode", "ana1234").matches(&doc));
        assert!(!Filter::field_eq("referredBy", "u1").matches(&doc));
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(Collection::AffiliateClicks.as_str(), "affiliate_clicks");
        assert_eq!(Collection::Users.to_string(), "users");
    }
}
