//! Client-scoped key-value storage.
//!
//! Referral state lives with the visitor, not the account. Two scopes are
//! passed around explicitly:
//!
//! - *persistent*: survives across visits (the pending referral code, the
//!   referred partner)
//! - *visit*: lasts for one browsing session (click de-duplication flags)
//!
//! Over HTTP both scopes are backed by the visitor's tower session under
//! different key prefixes, see [`SessionStorage`]. Visit keys include the
//! id from the `mb_visit` cookie, so they stop matching once the browser
//! session ends.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tower_sessions::Session;

use crate::middleware::VisitId;

/// Well-known storage keys.
pub mod keys {
    /// Pending affiliate code captured from a link.
    pub const PENDING_REFERRAL: &str = "moda_brasil_ref";

    /// Legacy partner uid captured from a `seller` link.
    pub const REFERRED_SELLER: &str = "referredSellerId";

    /// Visit flag marking that a click for `code` was already recorded.
    #[must_use]
    pub fn click_recorded(code: &str) -> String {
        format!("click_recorded_{code}")
    }
}

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Session store error.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// String key-value storage owned by the client.
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Missing keys are not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage, one instance per scope.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .write()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

/// Storage scoped inside a tower session.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    session: Session,
    prefix: String,
}

impl SessionStorage {
    /// The persistent scope of a visitor's session.
    #[must_use]
    pub fn persistent(session: Session) -> Self {
        Self {
            session,
            prefix: "local:".to_owned(),
        }
    }

    /// The scope of one visit within a visitor's session.
    #[must_use]
    pub fn visit(session: Session, visit: &VisitId) -> Self {
        Self {
            session,
            prefix: format!("visit:{}:", visit.0),
        }
    }

    fn key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }
}

#[async_trait]
impl ClientStorage for SessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.session.get::<String>(&self.key(key)).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.session.insert(&self.key(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.session.remove::<String>(&self.key(key)).await?;
        Ok(())
    }
}
