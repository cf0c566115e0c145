//! Withdrawal request repository.

use moda_brasil_core::{UserId, WithdrawalId};

use super::{RepositoryError, decode, encode};
use crate::models::WithdrawalRequest;
use crate::store::{Collection, Document, DocumentStore, Filter};

/// Repository for the `withdrawals` collection.
pub struct WithdrawalRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> WithdrawalRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Record a withdrawal request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn add(&self, request: &WithdrawalRequest) -> Result<WithdrawalId, RepositoryError> {
        let id = self
            .store
            .add(Collection::Withdrawals, encode(request)?)
            .await?;
        Ok(WithdrawalId::new(id))
    }

    /// Requests made by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list_by_user(
        &self,
        uid: &UserId,
    ) -> Result<Vec<WithdrawalRequest>, RepositoryError> {
        let mut requests = self
            .store
            .list(
                Collection::Withdrawals,
                &Filter::field_eq("userId", uid.as_str()),
            )
            .await?
            .into_iter()
            .map(with_id)
            .collect::<Result<Vec<_>, _>>()?;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }
}

fn with_id(doc: Document) -> Result<WithdrawalRequest, RepositoryError> {
    let id = WithdrawalId::new(doc.id.clone());
    let mut request: WithdrawalRequest = decode(doc)?;
    request.id = Some(id);
    Ok(request)
}
