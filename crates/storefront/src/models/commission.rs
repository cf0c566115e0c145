//! Affiliate commission ledger entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use moda_brasil_core::{CommissionId, CommissionStatus, Money, OrderId, UserId};

/// A commission owed to an affiliate for a referred user's order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commission {
    /// Document id. Not part of the stored body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CommissionId>,
    pub affiliate_id: UserId,
    pub from_user_id: UserId,
    pub from_user_name: String,
    pub order_id: OrderId,
    pub order_total: Money,
    pub amount: Money,
    pub percentage: Decimal,
    pub status: CommissionStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}
