//! Commission ledger repository.

use moda_brasil_core::{CommissionId, CommissionStatus, UserId};

use super::{RepositoryError, decode, encode};
use crate::models::Commission;
use crate::store::{Collection, Document, DocumentStore, Filter};

/// Repository for the `commissions` collection.
pub struct CommissionRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CommissionRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Append a commission under a generated id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn add(&self, commission: &Commission) -> Result<CommissionId, RepositoryError> {
        let id = self
            .store
            .add(Collection::Commissions, encode(commission)?)
            .await?;
        Ok(CommissionId::new(id))
    }

    /// A commission by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the lookup fails.
    pub async fn get(&self, id: &CommissionId) -> Result<Option<Commission>, RepositoryError> {
        self.store
            .get(Collection::Commissions, id.as_str())
            .await?
            .map(with_id)
            .transpose()
    }

    /// Commissions owed to an affiliate, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list_by_affiliate(
        &self,
        uid: &UserId,
    ) -> Result<Vec<Commission>, RepositoryError> {
        self.store
            .list(
                Collection::Commissions,
                &Filter::field_eq("affiliateId", uid.as_str()),
            )
            .await?
            .into_iter()
            .map(with_id)
            .collect()
    }

    /// Overwrite a commission's status. Callers validate the transition.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the commission does not exist.
    pub async fn set_status(
        &self,
        id: &CommissionId,
        status: CommissionStatus,
    ) -> Result<(), RepositoryError> {
        self.store
            .patch(
                Collection::Commissions,
                id.as_str(),
                serde_json::json!({ "status": status }),
            )
            .await
            .map_err(RepositoryError::from_store)
    }
}

fn with_id(doc: Document) -> Result<Commission, RepositoryError> {
    let id = CommissionId::new(doc.id.clone());
    let mut commission: Commission = decode(doc)?;
    commission.id = Some(id);
    Ok(commission)
}
