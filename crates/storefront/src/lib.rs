//! Moda Brasil storefront library.
//!
//! Catalog, checkout and affiliate attribution served as a JSON API. The
//! binary wires configuration, the document store and sessions around
//! [`app`]; tests build the same router over in-memory backends.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
pub mod store;

use axum::{Router, extract::State, http::StatusCode, middleware::from_fn_with_state, routing::get};
use tower_sessions::{SessionManagerLayer, SessionStore};

use state::AppState;

/// Build the application router.
///
/// `rate_limit` enables the per-IP limiters on auth and referral capture;
/// they need a client IP header, so tests build the router without them.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>, rate_limit: bool) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes(rate_limit))
        .layer(from_fn_with_state(
            state.config().is_secure(),
            middleware::visit_middleware,
        ))
        .layer(session_layer)
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the document store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
