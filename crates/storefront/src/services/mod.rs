//! Business logic services for storefront.
//!
//! # Services
//!
//! - `identity` - Accounts, passwords and session binding
//! - `referral` - Referral-code capture and click recording
//! - `profiles` - Profile creation with affiliate attribution
//! - `orders` - Checkout, affiliate and partner commission
//! - `stats` - Affiliate dashboard aggregation
//! - `partners` - Partner summary and withdrawal requests
//! - `catalog` - Catalog and admin maintenance

pub mod catalog;
pub mod identity;
pub mod orders;
pub mod partners;
pub mod profiles;
pub mod referral;
pub mod stats;

use std::fmt::Display;

pub use catalog::{CatalogError, CatalogService, demo_products};
pub use identity::{
    Account, AuthError, IdentityProvider, PasswordIdentityProvider, SignInState, bind_session,
};
pub use orders::{CheckoutItem, CheckoutRequest, OrderError, OrderService};
pub use partners::{PartnerError, PartnerService, PartnerSummary, ProductLink};
pub use profiles::ProfileService;
pub use referral::{CaptureOutcome, ReferralCapture};
pub use stats::{AffiliateStats, AffiliateStatsService};

/// Run a step whose failure must not abort the caller.
///
/// Errors are logged at `warn` with `context` and discarded.
pub fn best_effort<T, E: Display>(context: &str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "{context} failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_effort() {
        assert_eq!(best_effort::<_, String>("ok", Ok(3)), Some(3));
        assert_eq!(best_effort::<i32, _>("fails", Err("boom")), None);
    }
}
