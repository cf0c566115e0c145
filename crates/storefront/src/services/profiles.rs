//! Profile creation with affiliate attribution.

use tracing::instrument;

use moda_brasil_core::{AffiliateCode, Money, UserId};

use super::best_effort;
use crate::db::{RepositoryError, UserRepository};
use crate::models::{NewProfile, UserProfile};
use crate::storage::{ClientStorage, keys};
use crate::store::DocumentStore;

/// Creates user profiles.
pub struct ProfileService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ProfileService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Create the profile for a new account.
    ///
    /// A fresh affiliate code is generated. If the visitor arrived through an
    /// affiliate link, the pending code in `persistent` is resolved to its
    /// owner and recorded as `referredBy` (never the user themself). The
    /// pending code is cleared only when a referrer was set.
    ///
    /// Referral resolution is best-effort; only the profile write can fail.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the profile cannot be written.
    #[instrument(skip_all, fields(uid = %new.uid))]
    pub async fn create_profile(
        &self,
        new: NewProfile,
        persistent: &dyn ClientStorage,
    ) -> Result<UserProfile, RepositoryError> {
        let affiliate_code = AffiliateCode::generate(&new.name, &mut rand::rng());
        let referred_by = self.resolve_referrer(&new.uid, persistent).await;

        let profile = UserProfile {
            uid: new.uid,
            name: new.name,
            email: new.email,
            role: new.role,
            affiliate_code: Some(affiliate_code),
            referred_by,
            wallet_balance: Some(Money::ZERO),
            pix_key: None,
        };

        UserRepository::new(self.store).put(&profile).await?;
        tracing::info!(
            affiliate_code = ?profile.affiliate_code.as_ref().map(AffiliateCode::as_str),
            referred_by = ?profile.referred_by.as_ref().map(UserId::as_str),
            "Profile created"
        );

        if profile.referred_by.is_some() {
            best_effort(
                "clearing pending referral",
                persistent.remove(keys::PENDING_REFERRAL).await,
            );
        }

        Ok(profile)
    }

    async fn resolve_referrer(
        &self,
        uid: &UserId,
        persistent: &dyn ClientStorage,
    ) -> Option<UserId> {
        let code = best_effort(
            "reading pending referral",
            persistent.get(keys::PENDING_REFERRAL).await,
        )
        .flatten()?;

        let owner = best_effort(
            "resolving referral code",
            UserRepository::new(self.store)
                .find_by_affiliate_code(&AffiliateCode::new(code))
                .await,
        )
        .flatten()?;

        if &owner.uid == uid {
            tracing::debug!("Ignoring self-referral");
            return None;
        }
        Some(owner.uid)
    }
}
