//! Storefront partner reporting and payouts.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use moda_brasil_core::affiliate::partner_product_link;
use moda_brasil_core::{Money, ProductId, WithdrawalId, WithdrawalStatus};

use crate::db::{OrderRepository, RepositoryError, WithdrawalRepository};
use crate::models::{Order, UserProfile, WithdrawalRequest};
use crate::services::{CatalogError, CatalogService};
use crate::store::DocumentStore;

/// Errors from partner operations.
#[derive(Debug, Error)]
pub enum PartnerError {
    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Withdrawal amount is zero or negative.
    #[error("withdrawal amount must be positive")]
    InvalidAmount,

    /// No Pix key to pay the withdrawal to.
    #[error("a pix key is required")]
    MissingPixKey,

    /// Withdrawal exceeds the confirmed commission not yet requested.
    #[error("withdrawal exceeds available balance of {available}")]
    InsufficientBalance { available: Money },

    /// Product does not exist.
    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),
}

/// Partner dashboard totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerSummary {
    /// Number of orders credited to the partner.
    pub total_sales: usize,
    /// Partner commission across all orders.
    pub total_commission: Money,
    /// Partner commission on paid, shipped and delivered orders.
    pub confirmed_commission: Money,
}

impl PartnerSummary {
    #[must_use]
    pub fn from_orders(orders: &[Order]) -> Self {
        Self {
            total_sales: orders.len(),
            total_commission: orders.iter().map(|o| o.commission_amount).sum(),
            confirmed_commission: orders
                .iter()
                .filter(|o| o.status.is_confirmed())
                .map(|o| o.commission_amount)
                .sum(),
        }
    }
}

/// A shareable product link for a partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLink {
    pub link: String,
    /// Commission the partner earns per unit sold.
    pub commission: Money,
}

/// Partner operations.
pub struct PartnerService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> PartnerService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Totals over the partner's orders.
    ///
    /// # Errors
    ///
    /// Returns `PartnerError::Repository` if the query fails.
    pub async fn summary(&self, partner: &UserProfile) -> Result<PartnerSummary, PartnerError> {
        let orders = OrderRepository::new(self.store)
            .list_by_seller(&partner.uid)
            .await?;
        Ok(PartnerSummary::from_orders(&orders))
    }

    /// Share link for a product, crediting sales to `partner`.
    ///
    /// # Errors
    ///
    /// Returns `PartnerError::UnknownProduct` if the product does not exist.
    pub async fn product_link(
        &self,
        partner: &UserProfile,
        product_id: &ProductId,
        base_url: &str,
        partner_percent: Decimal,
    ) -> Result<ProductLink, PartnerError> {
        let product = match CatalogService::new(self.store).get_product(product_id).await {
            Ok(product) => product,
            Err(CatalogError::Repository(e)) => return Err(e.into()),
            Err(_) => return Err(PartnerError::UnknownProduct(product_id.clone())),
        };

        Ok(ProductLink {
            link: partner_product_link(base_url, product_id, &partner.uid),
            commission: product.base_price.percent(partner_percent),
        })
    }

    /// Confirmed commission minus withdrawals that are requested or paid.
    ///
    /// # Errors
    ///
    /// Returns `PartnerError::Repository` if a query fails.
    pub async fn available_balance(&self, partner: &UserProfile) -> Result<Money, PartnerError> {
        let summary = self.summary(partner).await?;
        let withdrawn: Money = self
            .withdrawals(partner)
            .await?
            .iter()
            .filter(|w| w.status != WithdrawalStatus::Rejected)
            .map(|w| w.amount)
            .sum();
        Ok(summary.confirmed_commission - withdrawn)
    }

    /// Record a withdrawal request for the admin to pay out to `pix_key`.
    ///
    /// # Errors
    ///
    /// Returns `PartnerError::InvalidAmount` unless `amount` is positive,
    /// `PartnerError::MissingPixKey` for a blank key and
    /// `PartnerError::InsufficientBalance` if `amount` is above
    /// [`Self::available_balance`].
    #[instrument(skip(self, partner, pix_key), fields(uid = %partner.uid))]
    pub async fn request_withdrawal(
        &self,
        partner: &UserProfile,
        amount: Money,
        pix_key: &str,
    ) -> Result<WithdrawalId, PartnerError> {
        if !amount.is_positive() {
            return Err(PartnerError::InvalidAmount);
        }
        let pix_key = pix_key.trim();
        if pix_key.is_empty() {
            return Err(PartnerError::MissingPixKey);
        }
        let available = self.available_balance(partner).await?;
        if amount > available {
            return Err(PartnerError::InsufficientBalance { available });
        }

        let request = WithdrawalRequest {
            id: None,
            user_id: partner.uid.clone(),
            user_name: partner.name.clone(),
            amount,
            pix_key: Some(pix_key.to_owned()),
            status: WithdrawalStatus::Requested,
            created_at: Utc::now(),
        };
        let id = WithdrawalRepository::new(self.store).add(&request).await?;
        tracing::info!(withdrawal_id = %id, "Withdrawal requested");
        Ok(id)
    }

    /// The partner's withdrawal requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns `PartnerError::Repository` if the query fails.
    pub async fn withdrawals(
        &self,
        partner: &UserProfile,
    ) -> Result<Vec<WithdrawalRequest>, PartnerError> {
        Ok(WithdrawalRepository::new(self.store)
            .list_by_user(&partner.uid)
            .await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use moda_brasil_core::{Email, OrderStatus, PaymentMethod, UserId, UserRole};

    use super::*;
    use crate::store::MemoryStore;

    fn partner() -> UserProfile {
        UserProfile {
            uid: UserId::new("loja"),
            name: "Loja da Carla".to_owned(),
            email: Email::parse("carla@exemplo.com").unwrap(),
            role: UserRole::Seller,
            affiliate_code: None,
            referred_by: None,
            wallet_balance: Some(Money::ZERO),
            pix_key: Some("carla@exemplo.com".to_owned()),
        }
    }

    fn order(status: OrderStatus, commission_centavos: i64) -> Order {
        Order {
            id: None,
            customer_id: UserId::new("c"),
            customer_name: "Cliente".to_owned(),
            seller_id: Some(UserId::new("loja")),
            seller_name: Some("Loja da Carla".to_owned()),
            affiliate_id: None,
            affiliate_commission: None,
            items: Vec::new(),
            total_amount: Money::from_centavos(commission_centavos * 10),
            commission_amount: Money::from_centavos(commission_centavos),
            status,
            created_at: Utc::now(),
            payment_method: PaymentMethod::Pix,
            tracking_code: None,
        }
    }

    #[test]
    fn test_summary_counts_confirmed_commission() {
        let summary = PartnerSummary::from_orders(&[
            order(OrderStatus::Pending, 1_000),
            order(OrderStatus::Paid, 500),
            order(OrderStatus::Shipped, 200),
            order(OrderStatus::Delivered, 100),
            order(OrderStatus::Cancelled, 50),
        ]);

        assert_eq!(summary.total_sales, 5);
        assert_eq!(summary.total_commission, Money::from_centavos(1_850));
        assert_eq!(summary.confirmed_commission, Money::from_centavos(800));
    }

    async fn credit(store: &MemoryStore, status: OrderStatus, commission_centavos: i64) {
        OrderRepository::new(store)
            .add(&order(status, commission_centavos))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_withdrawal_request() {
        let store = MemoryStore::new();
        credit(&store, OrderStatus::Paid, 8_000).await;
        let service = PartnerService::new(&store);

        let rejected = service
            .request_withdrawal(&partner(), Money::ZERO, "carla@exemplo.com")
            .await;
        assert!(matches!(rejected, Err(PartnerError::InvalidAmount)));

        service
            .request_withdrawal(&partner(), Money::from_centavos(5_000), " carla@exemplo.com ")
            .await
            .unwrap();
        let requests = service.withdrawals(&partner()).await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].status, WithdrawalStatus::Requested);
        assert_eq!(requests[0].pix_key.as_deref(), Some("carla@exemplo.com"));
    }

    #[tokio::test]
    async fn test_withdrawal_requires_pix_key() {
        let store = MemoryStore::new();
        credit(&store, OrderStatus::Delivered, 8_000).await;

        let result = PartnerService::new(&store)
            .request_withdrawal(&partner(), Money::from_centavos(1_000), "   ")
            .await;
        assert!(matches!(result, Err(PartnerError::MissingPixKey)));
    }

    #[tokio::test]
    async fn test_withdrawal_capped_at_unrequested_confirmed_commission() {
        let store = MemoryStore::new();
        credit(&store, OrderStatus::Paid, 8_000).await;
        credit(&store, OrderStatus::Pending, 9_000).await;
        let service = PartnerService::new(&store);

        let over = service
            .request_withdrawal(&partner(), Money::from_centavos(8_001), "pix")
            .await;
        assert!(matches!(
            over,
            Err(PartnerError::InsufficientBalance { available }) if available == Money::from_centavos(8_000)
        ));

        service
            .request_withdrawal(&partner(), Money::from_centavos(6_000), "pix")
            .await
            .unwrap();
        assert_eq!(
            service.available_balance(&partner()).await.unwrap(),
            Money::from_centavos(2_000)
        );

        let second = service
            .request_withdrawal(&partner(), Money::from_centavos(3_000), "pix")
            .await;
        assert!(matches!(second, Err(PartnerError::InsufficientBalance { .. })));
    }

    #[tokio::test]
    async fn test_withdrawal_rejected_without_confirmed_commission() {
        let store = MemoryStore::new();
        credit(&store, OrderStatus::Pending, 8_000).await;

        let result = PartnerService::new(&store)
            .request_withdrawal(&partner(), Money::from_centavos(1), "pix")
            .await;
        assert!(matches!(result, Err(PartnerError::InsufficientBalance { .. })));
    }

    #[tokio::test]
    async fn test_product_link_for_demo_product() {
        let store = MemoryStore::new();
        let link = PartnerService::new(&store)
            .product_link(&partner(), &ProductId::new("1"), "https://modabrasil.com", Decimal::from(10))
            .await
            .unwrap();

        assert_eq!(link.link, "https://modabrasil.com#/product/1?seller=loja");
        assert_eq!(link.commission, Money::from_centavos(899));

        let missing = PartnerService::new(&store)
            .product_link(&partner(), &ProductId::new("99"), "https://modabrasil.com", Decimal::from(10))
            .await;
        assert!(matches!(missing, Err(PartnerError::UnknownProduct(_))));
    }
}
