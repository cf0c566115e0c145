//! Affiliate click log.

use moda_brasil_core::{ClickId, UserId};

use super::{RepositoryError, decode, encode};
use crate::models::AffiliateClick;
use crate::store::{Collection, DocumentStore, Filter};

/// Repository for the append-only `affiliate_clicks` collection.
pub struct ClickRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ClickRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Append a click.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn add(&self, click: &AffiliateClick) -> Result<ClickId, RepositoryError> {
        let id = self
            .store
            .add(Collection::AffiliateClicks, encode(click)?)
            .await?;
        Ok(ClickId::new(id))
    }

    /// Clicks attributed to an affiliate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list_by_affiliate(
        &self,
        uid: &UserId,
    ) -> Result<Vec<AffiliateClick>, RepositoryError> {
        self.store
            .list(
                Collection::AffiliateClicks,
                &Filter::field_eq("affiliateId", uid.as_str()),
            )
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }
}
