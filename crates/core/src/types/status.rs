//! Status and role enums for stored documents.
//!
//! Each enum serializes to the lowercase string stored in the document and
//! round-trips through `Display` / `FromStr` with the same spelling, so the
//! same values can be used in store filters and query strings.

use serde::{Deserialize, Serialize};

/// Implements `Display` and `FromStr` from a list of `Variant => "text"` pairs.
macro_rules! string_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// The stored string form of this value.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("invalid ", $label, ": {}"), s)),
                }
            }
        }
    };
}

/// Role of a storefront account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular shopper.
    #[default]
    Customer,
    /// Storefront partner earning commission on orders they are credited with.
    Seller,
    /// Catalog and user management.
    Admin,
}

string_enum!(UserRole, "user role", {
    Customer => "customer",
    Seller => "seller",
    Admin => "admin",
});

/// Order lifecycle status.
///
/// Orders are created `Pending`; later states are set by the fulfillment
/// process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

string_enum!(OrderStatus, "order status", {
    Pending => "pending",
    Paid => "paid",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl OrderStatus {
    /// Whether payment for the order has been confirmed.
    ///
    /// Partner commission on a confirmed order counts as earned.
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Paid | Self::Shipped | Self::Delivered)
    }
}

/// Affiliate commission ledger status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    #[default]
    Pending,
    Approved,
    Paid,
    Cancelled,
}

string_enum!(CommissionStatus, "commission status", {
    Pending => "pending",
    Approved => "approved",
    Paid => "paid",
    Cancelled => "cancelled",
});

impl CommissionStatus {
    /// Whether a commission in this state counts towards earned totals.
    #[must_use]
    pub const fn is_earned(&self) -> bool {
        matches!(self, Self::Approved | Self::Paid)
    }

    /// Whether an out-of-band update may move a commission to `next`.
    ///
    /// `pending -> approved | cancelled`, `approved -> paid | cancelled`.
    /// `paid` and `cancelled` are final.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved | Self::Cancelled)
                | (Self::Approved, Self::Paid | Self::Cancelled)
        )
    }
}

/// How the customer pays at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Pix,
    Card,
}

string_enum!(PaymentMethod, "payment method", {
    Pix => "pix",
    Card => "card",
});

/// Status of a payout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    #[default]
    Requested,
    Paid,
    Rejected,
}

string_enum!(WithdrawalStatus, "withdrawal status", {
    Requested => "requested",
    Paid => "paid",
    Rejected => "rejected",
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Customer, UserRole::Seller, UserRole::Admin] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
            let json = serde_json::to_value(role).unwrap();
            assert_eq!(json, serde_json::Value::String(role.to_string()));
        }
        assert!("superuser".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_commission_transitions() {
        use CommissionStatus::{Approved, Cancelled, Paid, Pending};

        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Approved.can_transition_to(Paid));
        assert!(Approved.can_transition_to(Cancelled));

        assert!(!Pending.can_transition_to(Paid));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Paid.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Approved));
    }

    #[test]
    fn test_earned_statuses() {
        assert!(CommissionStatus::Approved.is_earned());
        assert!(CommissionStatus::Paid.is_earned());
        assert!(!CommissionStatus::Pending.is_earned());
        assert!(!CommissionStatus::Cancelled.is_earned());
    }

    #[test]
    fn test_confirmed_orders() {
        assert!(!OrderStatus::Pending.is_confirmed());
        assert!(OrderStatus::Paid.is_confirmed());
        assert!(OrderStatus::Shipped.is_confirmed());
        assert!(OrderStatus::Delivered.is_confirmed());
        assert!(!OrderStatus::Cancelled.is_confirmed());
    }

    #[test]
    fn test_order_status_error_message() {
        let err = "lost".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err, "invalid order status: lost");
    }
}
