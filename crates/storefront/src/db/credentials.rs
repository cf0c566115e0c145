//! Password credentials for the local identity provider.
//!
//! Documents are keyed by generated uid and hold `email` and `passwordHash`.

use moda_brasil_core::{Email, UserId};
use serde::{Deserialize, Serialize};

use super::{RepositoryError, decode, encode};
use crate::store::{Collection, DocumentStore, Filter};

/// A stored credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub email: Email,
    pub password_hash: String,
}

/// Repository for the `credentials` collection.
pub struct CredentialRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CredentialRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Look up the account for an email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn get_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(UserId, Credential)>, RepositoryError> {
        let Some(doc) = self
            .store
            .list(
                Collection::Credentials,
                &Filter::field_eq("email", email.as_str()),
            )
            .await?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };

        let uid = UserId::new(doc.id.clone());
        Ok(Some((uid, decode(doc)?)))
    }

    /// Store a credential for a new account.
    ///
    /// Email uniqueness is enforced by the store, so concurrent sign-ups for
    /// one email cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    /// Returns `RepositoryError::Store` for other store errors.
    pub async fn create(
        &self,
        uid: &UserId,
        credential: &Credential,
    ) -> Result<(), RepositoryError> {
        self.store
            .put(Collection::Credentials, uid.as_str(), encode(credential)?)
            .await
            .map_err(RepositoryError::from_store)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;

    fn credential(email: &str) -> Credential {
        Credential {
            email: Email::parse(email).unwrap(),
            password_hash: "hash".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_concurrent_creates_for_one_email() {
        let store = Arc::new(MemoryStore::new());
        let attempts = (0..8).map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                CredentialRepository::new(store.as_ref())
                    .create(&UserId::new(format!("u{i}")), &credential("ana@exemplo.com"))
                    .await
            })
        });

        let mut created = 0;
        for attempt in attempts.collect::<Vec<_>>() {
            match attempt.await.unwrap() {
                Ok(()) => created += 1,
                Err(e) => assert!(matches!(e, RepositoryError::Conflict(_))),
            }
        }
        assert_eq!(created, 1);

        let (_, stored) = CredentialRepository::new(store.as_ref())
            .get_by_email(&Email::parse("ana@exemplo.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.password_hash, "hash");
    }
}
