//! Partner payout requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use moda_brasil_core::{Money, UserId, WithdrawalId, WithdrawalStatus};

/// A request by a partner to withdraw earned commission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<WithdrawalId>,
    pub user_id: UserId,
    pub user_name: String,
    pub amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pix_key: Option<String>,
    pub status: WithdrawalStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}
