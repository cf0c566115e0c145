//! Authentication middleware and extractors.
//!
//! The session holds a [`CurrentUser`] snapshot written by
//! `services::bind_session`. Role checks always reload the profile from the
//! `users` collection so an admin's role change applies on the next request.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::models::{CurrentUser, UserProfile, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Olá, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a signed-in storefront partner.
pub struct RequireSeller(pub UserProfile);

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub UserProfile);

/// Error returned when an extractor rejects the request.
#[derive(Debug)]
pub enum AuthRejection {
    /// No signed-in user.
    Unauthorized,
    /// Signed in without the required role.
    Forbidden,
    /// Session or profile lookup failed.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Sign in required"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Insufficient permissions"),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn current_user(parts: &Parts) -> Result<Option<CurrentUser>, AuthRejection> {
    // Set by SessionManagerLayer
    let Some(session) = parts.extensions.get::<Session>() else {
        return Ok(None);
    };

    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to read current user from session");
            AuthRejection::Internal
        })
}

async fn load_profile(
    parts: &Parts,
    state: &AppState,
) -> Result<UserProfile, AuthRejection> {
    let user = current_user(parts).await?.ok_or(AuthRejection::Unauthorized)?;

    UserRepository::new(state.store())
        .get(&user.uid)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, uid = %user.uid, "Failed to load profile");
            AuthRejection::Internal
        })?
        .ok_or(AuthRejection::Forbidden)
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts)
            .await?
            .map(Self)
            .ok_or(AuthRejection::Unauthorized)
    }
}

impl FromRequestParts<AppState> for RequireSeller {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let profile = load_profile(parts, state).await?;
        if !profile.is_seller() {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(profile))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let profile = load_profile(parts, state).await?;
        if !profile.is_admin() {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(profile))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is signed in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await.ok().flatten()))
    }
}
