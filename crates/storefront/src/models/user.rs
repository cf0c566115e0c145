//! User profiles.

use serde::{Deserialize, Serialize};

use moda_brasil_core::{AffiliateCode, Email, Money, UserId, UserRole};

/// Profile document stored under the account uid in `users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliate_code: Option<AffiliateCode>,
    /// Uid of the affiliate who referred this user. Set once, at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_by: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_balance: Option<Money>,
    /// Pix key for payouts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pix_key: Option<String>,
}

impl UserProfile {
    /// Whether the user is a storefront partner.
    #[must_use]
    pub fn is_seller(&self) -> bool {
        self.role == UserRole::Seller
    }

    /// Whether the user is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Input for profile creation.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub uid: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_profile_document_shape() {
        let profile = UserProfile {
            uid: UserId::new("u1"),
            name: "Ana Souza".to_owned(),
            email: Email::parse("ana@exemplo.com").unwrap(),
            role: UserRole::Customer,
            affiliate_code: Some(AffiliateCode::new("ANA1234")),
            referred_by: None,
            wallet_balance: Some(Money::ZERO),
            pix_key: None,
        };

        let doc = serde_json::to_value(&profile).unwrap();
        assert_eq!(
            doc,
            json!({
                "uid": "u1",
                "name": "Ana Souza",
                "email": "ana@exemplo.com",
                "role": "customer",
                "affiliateCode": "ANA1234",
                "walletBalance": "0"
            })
        );
    }

    #[test]
    fn test_profile_reads_sparse_document() {
        let profile: UserProfile = serde_json::from_value(json!({
            "uid": "u2",
            "name": "Bruno",
            "email": "bruno@exemplo.com",
            "referredBy": "u1"
        }))
        .unwrap();

        assert_eq!(profile.role, UserRole::Customer);
        assert_eq!(profile.referred_by, Some(UserId::new("u1")));
        assert!(profile.affiliate_code.is_none());
    }
}
