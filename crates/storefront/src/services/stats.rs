//! Affiliate dashboard statistics.

use serde::Serialize;
use tracing::instrument;

use moda_brasil_core::{CommissionStatus, Money, UserId};

use crate::db::{ClickRepository, CommissionRepository, RepositoryError, UserRepository};
use crate::models::{AffiliateClick, Commission, UserProfile};
use crate::store::DocumentStore;

/// Aggregated statistics for one affiliate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffiliateStats {
    pub clicks: usize,
    pub referrals: usize,
    pub referred_users: Vec<UserProfile>,
    /// Newest first.
    pub commissions: Vec<Commission>,
    /// Sum of `pending` commissions.
    pub pending_balance: Money,
    /// Sum of `approved` and `paid` commissions.
    pub total_earned: Money,
}

impl AffiliateStats {
    /// Aggregate raw query results.
    #[must_use]
    pub fn aggregate(
        clicks: &[AffiliateClick],
        referred_users: Vec<UserProfile>,
        mut commissions: Vec<Commission>,
    ) -> Self {
        commissions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let pending_balance = commissions
            .iter()
            .filter(|c| c.status == CommissionStatus::Pending)
            .map(|c| c.amount)
            .sum();
        let total_earned = commissions
            .iter()
            .filter(|c| c.status.is_earned())
            .map(|c| c.amount)
            .sum();

        Self {
            clicks: clicks.len(),
            referrals: referred_users.len(),
            referred_users,
            commissions,
            pending_balance,
            total_earned,
        }
    }
}

/// Computes affiliate statistics.
pub struct AffiliateStatsService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> AffiliateStatsService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Statistics for the affiliate `uid`.
    ///
    /// The click, referral and commission queries are independent and run
    /// concurrently.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if any of the queries fails.
    #[instrument(skip(self))]
    pub async fn stats(&self, uid: &UserId) -> Result<AffiliateStats, RepositoryError> {
        let clicks = ClickRepository::new(self.store);
        let users = UserRepository::new(self.store);
        let commissions = CommissionRepository::new(self.store);

        let (clicks, referred, commissions) = tokio::try_join!(
            clicks.list_by_affiliate(uid),
            users.list_by_referrer(uid),
            commissions.list_by_affiliate(uid),
        )?;

        Ok(AffiliateStats::aggregate(&clicks, referred, commissions))
    }
}
