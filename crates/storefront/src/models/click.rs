//! Affiliate link clicks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use moda_brasil_core::{AffiliateCode, UserId};

/// One recorded visit through an affiliate link. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffiliateClick {
    pub affiliate_code: AffiliateCode,
    pub affiliate_id: UserId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub user_agent: String,
    /// Path of the page the visitor landed on.
    pub origin: String,
}
