//! Referral capture.
//!
//! Runs on every page visit. A code found in the URL is kept in the
//! visitor's persistent storage until a profile is created, and the visit is
//! logged as a click once per browsing session.

use chrono::Utc;
use serde::Serialize;
use tracing::instrument;

use moda_brasil_core::referral::{find_referral_code, find_seller_param, origin_path};
use moda_brasil_core::{AffiliateCode, ReferralLocation, UserId};

use super::best_effort;
use crate::db::{ClickRepository, UserRepository};
use crate::models::AffiliateClick;
use crate::storage::{ClientStorage, keys};
use crate::store::DocumentStore;

/// What a capture found and did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOutcome {
    /// Affiliate code found in the URL.
    pub code: Option<AffiliateCode>,
    /// Whether a click document was written on this call.
    pub click_recorded: bool,
    /// Legacy partner uid found in the URL.
    pub seller: Option<UserId>,
}

/// Captures referral codes and records affiliate clicks.
pub struct ReferralCapture<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ReferralCapture<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Inspect `location` for a referral code and record it.
    ///
    /// Never fails: storage and store errors are logged and the rest of the
    /// capture carries on.
    #[instrument(skip_all, fields(url = %location.url))]
    pub async fn capture(
        &self,
        location: &ReferralLocation,
        user_agent: &str,
        persistent: &dyn ClientStorage,
        visit: &dyn ClientStorage,
    ) -> CaptureOutcome {
        let mut outcome = CaptureOutcome::default();

        if let Some(code) = find_referral_code(location) {
            let code = AffiliateCode::new(code);
            best_effort(
                "storing pending referral",
                persistent.set(keys::PENDING_REFERRAL, code.as_str()).await,
            );
            outcome.click_recorded = self
                .record_click(&code, &location.url, user_agent, visit)
                .await;
            outcome.code = Some(code);
        }

        // Legacy partner links are stored as-is; they are checked at checkout.
        if let Some(seller) = find_seller_param(location) {
            best_effort(
                "storing referred seller",
                persistent.set(keys::REFERRED_SELLER, &seller).await,
            );
            outcome.seller = Some(UserId::new(seller));
        }

        outcome
    }

    /// Record one click per code per visit. Returns whether a click was written.
    async fn record_click(
        &self,
        code: &AffiliateCode,
        url: &str,
        user_agent: &str,
        visit: &dyn ClientStorage,
    ) -> bool {
        let flag = keys::click_recorded(code.as_str());
        match visit.get(&flag).await {
            Ok(Some(_)) => return false,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Reading click flag failed");
                return false;
            }
        }

        let owner = best_effort(
            "resolving affiliate code",
            UserRepository::new(self.store)
                .find_by_affiliate_code(code)
                .await,
        )
        .flatten();
        let Some(owner) = owner else {
            tracing::debug!(code = %code, "Unknown affiliate code, no click recorded");
            return false;
        };

        let click = AffiliateClick {
            affiliate_code: code.clone(),
            affiliate_id: owner.uid,
            timestamp: Utc::now(),
            user_agent: user_agent.to_owned(),
            origin: origin_path(url),
        };

        if best_effort("recording click", ClickRepository::new(self.store).add(&click).await)
            .is_none()
        {
            return false;
        }

        best_effort("setting click flag", visit.set(&flag, "true").await);
        tracing::info!(code = %code, affiliate_id = %click.affiliate_id, "Affiliate click recorded");
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use moda_brasil_core::{Email, UserRole};

    use super::*;
    use crate::models::UserProfile;
    use crate::storage::MemoryStorage;
    use crate::store::MemoryStore;

    async fn store_with_affiliate() -> MemoryStore {
        let store = MemoryStore::new();
        UserRepository::new(&store)
            .put(&UserProfile {
                uid: UserId::new("ana"),
                name: "Ana".to_owned(),
                email: Email::parse("ana@exemplo.com").unwrap(),
                role: UserRole::Customer,
                affiliate_code: Some(AffiliateCode::new("ANA1234")),
                referred_by: None,
                wallet_balance: None,
                pix_key: None,
            })
            .await
            .unwrap();
        store
    }

    async fn clicks(store: &MemoryStore) -> usize {
        ClickRepository::new(store)
            .list_by_affiliate(&UserId::new("ana"))
            .await
            .unwrap()
            .len()
    }

    #[tokio::test]
    async fn test_no_code_leaves_storage_untouched() {
        let store = store_with_affiliate().await;
        let persistent = MemoryStorage::new();
        persistent.set(keys::PENDING_REFERRAL, "OLD").await.unwrap();
        let visit = MemoryStorage::new();

        let outcome = ReferralCapture::new(&store)
            .capture(
                &ReferralLocation::from_url("https://modabrasil.com.br/#/cart"),
                "test-agent",
                &persistent,
                &visit,
            )
            .await;

        assert_eq!(outcome, CaptureOutcome::default());
        assert_eq!(
            persistent.get(keys::PENDING_REFERRAL).await.unwrap().as_deref(),
            Some("OLD")
        );
    }

    #[tokio::test]
    async fn test_click_recorded_once_per_visit() {
        let store = store_with_affiliate().await;
        let persistent = MemoryStorage::new();
        let location = ReferralLocation::from_url("https://modabrasil.com.br/?ref=ANA1234#/login");
        let capture = ReferralCapture::new(&store);

        let visit = MemoryStorage::new();
        let first = capture.capture(&location, "ua", &persistent, &visit).await;
        let second = capture.capture(&location, "ua", &persistent, &visit).await;
        assert!(first.click_recorded);
        assert!(!second.click_recorded);
        assert_eq!(clicks(&store).await, 1);

        let new_visit = MemoryStorage::new();
        let third = capture.capture(&location, "ua", &persistent, &new_visit).await;
        assert!(third.click_recorded);
        assert_eq!(clicks(&store).await, 2);

        let recorded = ClickRepository::new(&store)
            .list_by_affiliate(&UserId::new("ana"))
            .await
            .unwrap();
        assert_eq!(recorded[0].origin, "/");
        assert_eq!(recorded[0].user_agent, "ua");
    }

    #[tokio::test]
    async fn test_unknown_code_is_stored_but_not_clicked() {
        let store = store_with_affiliate().await;
        let persistent = MemoryStorage::new();
        let visit = MemoryStorage::new();

        let outcome = ReferralCapture::new(&store)
            .capture(
                &ReferralLocation::from_url("https://modabrasil.com.br/?ref=NOBODY99"),
                "ua",
                &persistent,
                &visit,
            )
            .await;

        assert!(!outcome.click_recorded);
        assert_eq!(
            persistent.get(keys::PENDING_REFERRAL).await.unwrap().as_deref(),
            Some("NOBODY99")
        );
        assert!(
            visit
                .get(&keys::click_recorded("NOBODY99"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_seller_param_stored_independently() {
        let store = store_with_affiliate().await;
        let persistent = MemoryStorage::new();
        let visit = MemoryStorage::new();

        let outcome = ReferralCapture::new(&store)
            .capture(
                &ReferralLocation::from_url("https://modabrasil.com.br/#/product/p1?seller=loja-1"),
                "ua",
                &persistent,
                &visit,
            )
            .await;

        assert_eq!(outcome.seller, Some(UserId::new("loja-1")));
        assert!(outcome.code.is_none());
        assert_eq!(
            persistent.get(keys::REFERRED_SELLER).await.unwrap().as_deref(),
            Some("loja-1")
        );
    }
}
