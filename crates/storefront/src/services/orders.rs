//! Checkout and order creation with commission.
//!
//! Two independent commissions can attach to an order:
//!
//! - the *affiliate* commission (5%), owed to whoever referred the purchaser
//!   and recorded in the `commissions` ledger;
//! - the *partner* commission (configurable, 10% by default), owed to the
//!   storefront partner credited with the sale and stored on the order.
//!
//! They are cumulative and not capped.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use moda_brasil_core::{
    AFFILIATE_COMMISSION_PERCENT, CommissionStatus, OrderId, OrderStatus, PaymentMethod,
    ProductId, UserId, UserRole,
};

use super::best_effort;
use crate::db::{
    CommissionRepository, OrderRepository, ProductRepository, RepositoryError, UserRepository,
};
use crate::models::{Commission, CurrentUser, Order, OrderDraft, OrderItem, UserProfile};
use crate::storage::{ClientStorage, keys};
use crate::store::DocumentStore;

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Order written but its commission was not.
    #[error("commission for order {order_id} not recorded: {source}")]
    Commission {
        order_id: OrderId,
        source: RepositoryError,
    },

    /// Checkout with no items.
    #[error("order has no items")]
    EmptyOrder,

    /// Item quantity of zero.
    #[error("item quantity must be at least 1")]
    InvalidQuantity,

    /// Item refers to a product that does not exist.
    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),

    /// Chosen partner is not a seller.
    #[error("unknown seller: {0}")]
    UnknownSeller(UserId),

    /// Order does not exist.
    #[error("order not found")]
    NotFound,
}

/// A cart line submitted at checkout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub product_id: ProductId,
    pub selected_size: String,
    pub selected_color: String,
    pub quantity: u32,
}

/// Checkout submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Partner chosen explicitly by the customer.
    #[serde(default)]
    pub seller_id: Option<UserId>,
}

/// Order operations.
pub struct OrderService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Persist an order and, for referred purchasers, its affiliate commission.
    ///
    /// The purchaser's profile decides attribution: if it has `referredBy`,
    /// 5% of the total (rounded to centavos) is recorded on the order and, when
    /// positive, appended to the ledger as a `pending` commission.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the profile lookup or order write
    /// fails, and `OrderError::Commission` if the order was written but the
    /// commission was not.
    #[instrument(skip_all, fields(customer_id = %draft.customer_id, total = %draft.total_amount))]
    pub async fn create_order(&self, draft: OrderDraft) -> Result<OrderId, OrderError> {
        let purchaser = UserRepository::new(self.store)
            .get(&draft.customer_id)
            .await?;
        let referrer = purchaser.and_then(|p| p.referred_by);
        let affiliate_commission = referrer
            .as_ref()
            .map(|_| draft.total_amount.percent(AFFILIATE_COMMISSION_PERCENT));

        let order = Order {
            id: None,
            customer_id: draft.customer_id,
            customer_name: draft.customer_name,
            seller_id: draft.seller_id,
            seller_name: draft.seller_name,
            affiliate_id: referrer.clone(),
            affiliate_commission,
            items: draft.items,
            total_amount: draft.total_amount,
            commission_amount: draft.commission_amount,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            payment_method: draft.payment_method,
            tracking_code: None,
        };

        let order_id = OrderRepository::new(self.store).add(&order).await?;
        tracing::info!(order_id = %order_id, "Order created");

        if let (Some(affiliate_id), Some(amount)) = (referrer, affiliate_commission)
            && amount.is_positive()
        {
            let commission = Commission {
                id: None,
                affiliate_id,
                from_user_id: order.customer_id,
                from_user_name: order.customer_name,
                order_id: order_id.clone(),
                order_total: order.total_amount,
                amount,
                percentage: AFFILIATE_COMMISSION_PERCENT,
                status: CommissionStatus::Pending,
                created_at: Utc::now(),
            };

            if let Err(source) = CommissionRepository::new(self.store).add(&commission).await {
                tracing::error!(order_id = %order_id, error = %source, "Commission write failed");
                return Err(OrderError::Commission { order_id, source });
            }
            tracing::info!(
                order_id = %order_id,
                affiliate_id = %commission.affiliate_id,
                amount = %commission.amount,
                "Affiliate commission recorded"
            );
        }

        Ok(order_id)
    }

    /// Turn a checkout submission into an order.
    ///
    /// Prices come from the catalog. The partner is the explicit `sellerId`
    /// if given, otherwise the partner stored from a legacy `seller` link when
    /// it names an existing seller. The stored partner is cleared after a
    /// successful order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError` if the cart is invalid or the order cannot be
    /// created.
    #[instrument(skip_all, fields(uid = %customer.uid))]
    pub async fn checkout(
        &self,
        customer: &CurrentUser,
        request: CheckoutRequest,
        partner_percent: Decimal,
        persistent: &dyn ClientStorage,
    ) -> Result<OrderId, OrderError> {
        let items = self.price_items(request.items).await?;
        let customer_name = customer
            .profile
            .as_ref()
            .map_or_else(|| customer.email.to_string(), |p| p.name.clone());

        let mut draft = OrderDraft::from_items(
            customer.uid.clone(),
            customer_name,
            items,
            request.payment_method,
        );
        if let Some(partner) = self.resolve_partner(request.seller_id, persistent).await? {
            draft = draft.with_partner(partner.uid, partner.name, partner_percent);
        }

        let order_id = self.create_order(draft).await?;

        best_effort(
            "clearing referred seller",
            persistent.remove(keys::REFERRED_SELLER).await,
        );
        Ok(order_id)
    }

    /// Orders placed by a customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_for_customer(&self, uid: &UserId) -> Result<Vec<Order>, OrderError> {
        Ok(OrderRepository::new(self.store).list_by_customer(uid).await?)
    }

    /// Orders credited to a partner, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_for_seller(&self, uid: &UserId) -> Result<Vec<Order>, OrderError> {
        Ok(OrderRepository::new(self.store).list_by_seller(uid).await?)
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, OrderError> {
        Ok(OrderRepository::new(self.store).list_all().await?)
    }

    /// Record a fulfillment update from the admin or an external process.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order does not exist.
    #[instrument(skip(self))]
    pub async fn update_fulfillment(
        &self,
        id: &OrderId,
        status: OrderStatus,
        tracking_code: Option<&str>,
    ) -> Result<(), OrderError> {
        OrderRepository::new(self.store)
            .update_fulfillment(id, status, tracking_code)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => OrderError::NotFound,
                other => OrderError::Repository(other),
            })?;
        tracing::info!("Order fulfillment updated");
        Ok(())
    }

    async fn price_items(&self, items: Vec<CheckoutItem>) -> Result<Vec<OrderItem>, OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let products = ProductRepository::new(self.store);
        let mut priced = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity);
            }
            let product = products
                .get(&item.product_id)
                .await?
                .ok_or(OrderError::UnknownProduct(item.product_id))?;
            priced.push(OrderItem {
                product,
                selected_size: item.selected_size,
                selected_color: item.selected_color,
                quantity: item.quantity,
            });
        }
        Ok(priced)
    }

    async fn resolve_partner(
        &self,
        explicit: Option<UserId>,
        persistent: &dyn ClientStorage,
    ) -> Result<Option<UserProfile>, OrderError> {
        let users = UserRepository::new(self.store);

        if let Some(uid) = explicit {
            return match users.get(&uid).await? {
                Some(seller) if seller.role == UserRole::Seller => Ok(Some(seller)),
                _ => Err(OrderError::UnknownSeller(uid)),
            };
        }

        let Some(stored) = best_effort(
            "reading referred seller",
            persistent.get(keys::REFERRED_SELLER).await,
        )
        .flatten() else {
            return Ok(None);
        };

        let seller = users
            .get(&UserId::new(stored))
            .await?
            .filter(UserProfile::is_seller);
        Ok(seller)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use moda_brasil_core::{AffiliateCode, Email, Money};

    use super::*;
    use crate::db::ProductRepository;
    use crate::models::Product;
    use crate::storage::MemoryStorage;
    use crate::store::MemoryStore;

    fn profile(uid: &str, role: UserRole, referred_by: Option<&str>) -> UserProfile {
        UserProfile {
            uid: UserId::new(uid),
            name: uid.to_owned(),
            email: Email::parse(&format!("{uid}@exemplo.com")).unwrap(),
            role,
            affiliate_code: Some(AffiliateCode::new(format!("{}0000", uid.to_uppercase()))),
            referred_by: referred_by.map(UserId::new),
            wallet_balance: Some(Money::ZERO),
            pix_key: None,
        }
    }

    async fn seed(store: &MemoryStore) -> ProductId {
        let users = UserRepository::new(store);
        users.put(&profile("ana", UserRole::Customer, None)).await.unwrap();
        users.put(&profile("bruno", UserRole::Customer, Some("ana"))).await.unwrap();
        users.put(&profile("loja", UserRole::Seller, None)).await.unwrap();

        ProductRepository::new(store)
            .add(&Product {
                id: None,
                name: "Camiseta Brasil".to_owned(),
                description: String::new(),
                base_price: Money::from_centavos(10_000),
                sizes: vec!["M".to_owned()],
                colors: vec!["Amarelo".to_owned()],
                stock: 10,
                images: Vec::new(),
            })
            .await
            .unwrap()
    }

    fn draft(customer: &str, total_centavos: i64) -> OrderDraft {
        OrderDraft {
            customer_id: UserId::new(customer),
            customer_name: customer.to_owned(),
            seller_id: None,
            seller_name: None,
            items: Vec::new(),
            total_amount: Money::from_centavos(total_centavos),
            commission_amount: Money::ZERO,
            payment_method: PaymentMethod::Pix,
        }
    }

    fn current(uid: &str) -> CurrentUser {
        CurrentUser {
            uid: UserId::new(uid),
            email: Email::parse(&format!("{uid}@exemplo.com")).unwrap(),
            profile: Some(profile(uid, UserRole::Customer, None)),
        }
    }

    #[tokio::test]
    async fn test_referred_order_records_pending_commission() {
        let store = MemoryStore::new();
        seed(&store).await;

        let order_id = OrderService::new(&store)
            .create_order(draft("bruno", 20_000))
            .await
            .unwrap();

        let order = OrderRepository::new(&store).get(&order_id).await.unwrap().unwrap();
        assert_eq!(order.affiliate_id, Some(UserId::new("ana")));
        assert_eq!(order.affiliate_commission, Some(Money::from_centavos(1_000)));
        assert_eq!(order.status, OrderStatus::Pending);

        let commissions = CommissionRepository::new(&store)
            .list_by_affiliate(&UserId::new("ana"))
            .await
            .unwrap();
        assert_eq!(commissions.len(), 1);
        let c = &commissions[0];
        assert_eq!(c.amount, Money::from_centavos(1_000));
        assert_eq!(c.order_total, Money::from_centavos(20_000));
        assert_eq!(c.percentage, Decimal::from(5));
        assert_eq!(c.status, CommissionStatus::Pending);
        assert_eq!(c.order_id, order_id);
        assert_eq!(c.from_user_id, UserId::new("bruno"));
    }

    #[tokio::test]
    async fn test_unreferred_order_has_no_commission() {
        let store = MemoryStore::new();
        seed(&store).await;

        let order_id = OrderService::new(&store)
            .create_order(draft("ana", 20_000))
            .await
            .unwrap();

        let order = OrderRepository::new(&store).get(&order_id).await.unwrap().unwrap();
        assert!(order.affiliate_id.is_none());
        assert!(order.affiliate_commission.is_none());
        assert!(
            CommissionRepository::new(&store)
                .list_by_affiliate(&UserId::new("ana"))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_zero_total_skips_commission() {
        let store = MemoryStore::new();
        seed(&store).await;

        OrderService::new(&store)
            .create_order(draft("bruno", 0))
            .await
            .unwrap();

        assert!(
            CommissionRepository::new(&store)
                .list_by_affiliate(&UserId::new("ana"))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_checkout_uses_stored_seller_and_clears_it() {
        let store = MemoryStore::new();
        let product_id = seed(&store).await;
        let persistent = MemoryStorage::new();
        persistent.set(keys::REFERRED_SELLER, "loja").await.unwrap();

        let request = CheckoutRequest {
            items: vec![CheckoutItem {
                product_id,
                selected_size: "M".to_owned(),
                selected_color: "Amarelo".to_owned(),
                quantity: 2,
            }],
            payment_method: PaymentMethod::Card,
            seller_id: None,
        };

        let order_id = OrderService::new(&store)
            .checkout(&current("ana"), request, Decimal::from(10), &persistent)
            .await
            .unwrap();

        let order = OrderRepository::new(&store).get(&order_id).await.unwrap().unwrap();
        assert_eq!(order.total_amount, Money::from_centavos(20_000));
        assert_eq!(order.seller_id, Some(UserId::new("loja")));
        assert_eq!(order.commission_amount, Money::from_centavos(2_000));
        assert!(persistent.get(keys::REFERRED_SELLER).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_checkout_ignores_stored_non_seller() {
        let store = MemoryStore::new();
        let product_id = seed(&store).await;
        let persistent = MemoryStorage::new();
        persistent.set(keys::REFERRED_SELLER, "ana").await.unwrap();

        let request = CheckoutRequest {
            items: vec![CheckoutItem {
                product_id,
                selected_size: "M".to_owned(),
                selected_color: "Amarelo".to_owned(),
                quantity: 1,
            }],
            payment_method: PaymentMethod::Pix,
            seller_id: None,
        };

        let order_id = OrderService::new(&store)
            .checkout(&current("bruno"), request, Decimal::from(10), &persistent)
            .await
            .unwrap();

        let order = OrderRepository::new(&store).get(&order_id).await.unwrap().unwrap();
        assert!(order.seller_id.is_none());
        assert_eq!(order.commission_amount, Money::ZERO);
    }

    #[tokio::test]
    async fn test_checkout_rejects_bad_carts() {
        let store = MemoryStore::new();
        let product_id = seed(&store).await;
        let service = OrderService::new(&store);
        let persistent = MemoryStorage::new();

        let empty = CheckoutRequest {
            items: Vec::new(),
            payment_method: PaymentMethod::Pix,
            seller_id: None,
        };
        let result = service
            .checkout(&current("ana"), empty, Decimal::from(10), &persistent)
            .await;
        assert!(matches!(result, Err(OrderError::EmptyOrder)));

        let bad_seller = CheckoutRequest {
            items: vec![CheckoutItem {
                product_id,
                selected_size: "M".to_owned(),
                selected_color: "Amarelo".to_owned(),
                quantity: 1,
            }],
            payment_method: PaymentMethod::Pix,
            seller_id: Some(UserId::new("ana")),
        };
        let result = service
            .checkout(&current("bruno"), bad_seller, Decimal::from(10), &persistent)
            .await;
        assert!(matches!(result, Err(OrderError::UnknownSeller(_))));
    }

    #[tokio::test]
    async fn test_update_fulfillment() {
        let store = MemoryStore::new();
        seed(&store).await;
        let service = OrderService::new(&store);
        let order_id = service.create_order(draft("ana", 5_000)).await.unwrap();

        service
            .update_fulfillment(&order_id, OrderStatus::Shipped, Some("BR123456789"))
            .await
            .unwrap();
        let order = OrderRepository::new(&store).get(&order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.tracking_code.as_deref(), Some("BR123456789"));

        let missing = service
            .update_fulfillment(&OrderId::new("nope"), OrderStatus::Paid, None)
            .await;
        assert!(matches!(missing, Err(OrderError::NotFound)));
    }
}
