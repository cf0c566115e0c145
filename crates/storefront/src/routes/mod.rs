//! HTTP route handlers for storefront.
//!
//! All bodies are JSON with camelCase fields; money is a decimal string.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness check
//! GET    /health/ready                    - Document store connectivity
//!
//! # Auth (rate limited)
//! POST   /api/auth/register               - Create account and profile
//! POST   /api/auth/login                  - Sign in
//! POST   /api/auth/logout                 - Sign out
//! GET    /api/auth/me                     - Current user and profile
//!
//! # Referrals (rate limited)
//! POST   /api/referrals/capture           - Capture a referral code for a page URL
//!
//! # Catalog
//! GET    /api/products                    - Product listing
//! GET    /api/products/{id}               - Product detail
//! GET    /api/sellers                     - Storefront partners for checkout
//!
//! # Orders (requires auth)
//! POST   /api/orders                      - Checkout
//! GET    /api/orders                      - Order history
//!
//! # Affiliate (requires auth)
//! GET    /api/affiliate/stats             - Dashboard statistics
//! GET    /api/affiliate/link              - Shareable link
//!
//! # Partner (requires seller)
//! GET    /api/partner/orders              - Credited orders
//! GET    /api/partner/summary             - Commission totals
//! GET    /api/partner/products/{id}/link  - Product share link
//! GET    /api/partner/withdrawals         - Withdrawal requests
//! POST   /api/partner/withdrawals         - Request a withdrawal
//!
//! # Admin (requires admin)
//! POST   /api/admin/products              - Add product
//! DELETE /api/admin/products/{id}         - Delete product
//! GET    /api/admin/users                 - List users
//! DELETE /api/admin/users/{id}            - Delete user profile
//! GET    /api/admin/orders                - List orders
//! PATCH  /api/admin/orders/{id}           - Fulfillment status / tracking code
//! PATCH  /api/admin/commissions/{id}      - Commission status transition
//! ```

pub mod admin;
pub mod affiliate;
pub mod auth;
pub mod orders;
pub mod partner;
pub mod products;
pub mod referrals;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::middleware::{auth_rate_limiter, referral_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the referral routes router.
pub fn referral_routes() -> Router<AppState> {
    Router::new().route("/capture", post(referrals::capture))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list))
        .route("/products/{id}", get(products::show))
        .route("/sellers", get(products::sellers))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new().route("/", get(orders::list).post(orders::checkout))
}

/// Create the affiliate routes router.
pub fn affiliate_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(affiliate::stats))
        .route("/link", get(affiliate::link))
}

/// Create the partner routes router.
pub fn partner_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(partner::orders))
        .route("/summary", get(partner::summary))
        .route("/products/{id}/link", get(partner::product_link))
        .route(
            "/withdrawals",
            get(partner::withdrawals).post(partner::request_withdrawal),
        )
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(admin::add_product))
        .route("/products/{id}", delete(admin::delete_product))
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}", patch(admin::update_order))
        .route("/commissions/{id}", patch(admin::update_commission))
}

/// Build the complete API router.
///
/// With `rate_limit`, auth and referral capture are limited per client IP.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    let (auth, referrals) = if rate_limit {
        (
            auth_routes().layer(auth_rate_limiter()),
            referral_routes().layer(referral_rate_limiter()),
        )
    } else {
        (auth_routes(), referral_routes())
    };

    Router::new()
        .nest("/api/auth", auth)
        .nest("/api/referrals", referrals)
        .nest("/api", catalog_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/affiliate", affiliate_routes())
        .nest("/api/partner", partner_routes())
        .nest("/api/admin", admin_routes())
}
