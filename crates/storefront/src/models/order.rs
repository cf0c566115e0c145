//! Orders and checkout drafts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use moda_brasil_core::{Money, OrderId, OrderStatus, PaymentMethod, UserId};

use super::Product;

/// A line in an order: a product snapshot plus the chosen variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(flatten)]
    pub product: Product,
    pub selected_size: String,
    pub selected_color: String,
    pub quantity: u32,
}

impl OrderItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.product.base_price * self.quantity
    }
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,
    pub customer_id: UserId,
    pub customer_name: String,
    /// Storefront partner credited with the sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,
    /// Affiliate who referred the customer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliate_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliate_commission: Option<Money>,
    pub items: Vec<OrderItem>,
    pub total_amount: Money,
    /// Partner commission.
    pub commission_amount: Money,
    pub status: OrderStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_code: Option<String>,
}

/// An order as submitted at checkout, before attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub customer_id: UserId,
    pub customer_name: String,
    pub seller_id: Option<UserId>,
    pub seller_name: Option<String>,
    pub items: Vec<OrderItem>,
    pub total_amount: Money,
    pub commission_amount: Money,
    pub payment_method: PaymentMethod,
}

impl OrderDraft {
    /// Draft whose total is the sum of its line totals, with no partner.
    #[must_use]
    pub fn from_items(
        customer_id: UserId,
        customer_name: impl Into<String>,
        items: Vec<OrderItem>,
        payment_method: PaymentMethod,
    ) -> Self {
        let total_amount = items.iter().map(OrderItem::line_total).sum();
        Self {
            customer_id,
            customer_name: customer_name.into(),
            seller_id: None,
            seller_name: None,
            items,
            total_amount,
            commission_amount: Money::ZERO,
            payment_method,
        }
    }

    /// Credit the sale to a partner earning `percent` of the total.
    #[must_use]
    pub fn with_partner(mut self, seller_id: UserId, seller_name: String, percent: Decimal) -> Self {
        self.commission_amount = self.total_amount.percent(percent);
        self.seller_id = Some(seller_id);
        self.seller_name = Some(seller_name);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn item(price_centavos: i64, quantity: u32) -> OrderItem {
        OrderItem {
            product: Product {
                id: None,
                name: "Vestido Floral".to_owned(),
                description: String::new(),
                base_price: Money::from_centavos(price_centavos),
                sizes: vec!["M".to_owned()],
                colors: vec!["Azul".to_owned()],
                stock: 10,
                images: Vec::new(),
            },
            selected_size: "M".to_owned(),
            selected_color: "Azul".to_owned(),
            quantity,
        }
    }

    #[test]
    fn test_total_is_sum_of_lines() {
        let draft = OrderDraft::from_items(
            UserId::new("b"),
            "Bruno",
            vec![item(5_000, 2), item(10_000, 1)],
            PaymentMethod::Pix,
        );
        assert_eq!(draft.total_amount, Money::from_centavos(20_000));
        assert_eq!(draft.commission_amount, Money::ZERO);
    }

    #[test]
    fn test_partner_commission() {
        let draft = OrderDraft::from_items(UserId::new("b"), "Bruno", vec![item(8_990, 1)], PaymentMethod::Card)
            .with_partner(UserId::new("s"), "Loja da Carla".to_owned(), Decimal::from(10));
        assert_eq!(draft.commission_amount, Money::from_centavos(899));
        assert_eq!(draft.seller_id, Some(UserId::new("s")));
    }

    #[test]
    fn test_item_flattens_product_fields() {
        let doc = serde_json::to_value(item(4_990, 3)).unwrap();
        assert_eq!(doc["basePrice"], json!("49.90"));
        assert_eq!(doc["selectedSize"], json!("M"));
        assert_eq!(doc["quantity"], json!(3));
    }
}
