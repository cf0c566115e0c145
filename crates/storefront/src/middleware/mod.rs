//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions, `PostgreSQL` or memory store)
//! 5. Visit cookie (one id per browser session)
//! 6. Rate limiting on auth and referral capture (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod session;
pub mod visit;

pub use auth::{AuthRejection, OptionalAuth, RequireAdmin, RequireAuth, RequireSeller};
pub use rate_limit::{auth_rate_limiter, referral_rate_limiter};
pub use request_id::{RequestId, request_id_middleware};
pub use session::create_session_layer;
pub use visit::{VISIT_COOKIE_NAME, VisitId, visit_middleware};
