//! User profile repository.

use moda_brasil_core::{AffiliateCode, UserId, UserRole};

use super::{RepositoryError, decode, encode};
use crate::models::UserProfile;
use crate::store::{Collection, DocumentStore, Filter};

/// Repository for the `users` collection.
pub struct UserRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Get a profile by uid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the lookup fails.
    /// Returns `RepositoryError::DataCorruption` if the stored profile is invalid.
    pub async fn get(&self, uid: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        self.store
            .get(Collection::Users, uid.as_str())
            .await?
            .map(decode)
            .transpose()
    }

    /// Create or fully overwrite the profile stored under its uid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn put(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
        self.store
            .put(Collection::Users, profile.uid.as_str(), encode(profile)?)
            .await?;
        Ok(())
    }

    /// Find the owner of an affiliate code.
    ///
    /// Exact, case-sensitive match. Codes are not guaranteed unique; the
    /// earliest stored profile wins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn find_by_affiliate_code(
        &self,
        code: &AffiliateCode,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        self.store
            .list(
                Collection::Users,
                &Filter::field_eq("affiliateCode", code.as_str()),
            )
            .await?
            .into_iter()
            .next()
            .map(decode)
            .transpose()
    }

    /// Profiles referred by `uid`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list_by_referrer(&self, uid: &UserId) -> Result<Vec<UserProfile>, RepositoryError> {
        self.list(&Filter::field_eq("referredBy", uid.as_str())).await
    }

    /// Profiles with the given role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list_by_role(&self, role: UserRole) -> Result<Vec<UserProfile>, RepositoryError> {
        self.list(&Filter::field_eq("role", role.as_str())).await
    }

    /// Every profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<UserProfile>, RepositoryError> {
        self.list(&Filter::All).await
    }

    /// Update a profile's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no profile exists for `uid`.
    pub async fn set_role(&self, uid: &UserId, role: UserRole) -> Result<(), RepositoryError> {
        self.store
            .patch(
                Collection::Users,
                uid.as_str(),
                serde_json::json!({ "role": role }),
            )
            .await
            .map_err(RepositoryError::from_store)
    }

    /// Delete a profile. The account's credentials are left in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the delete fails.
    pub async fn delete(&self, uid: &UserId) -> Result<(), RepositoryError> {
        self.store.delete(Collection::Users, uid.as_str()).await?;
        Ok(())
    }

    async fn list(&self, filter: &Filter) -> Result<Vec<UserProfile>, RepositoryError> {
        self.store
            .list(Collection::Users, filter)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }
}
