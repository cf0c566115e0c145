//! Authentication route handlers.
//!
//! Registration creates the account and then the profile; the profile step
//! is where a pending affiliate referral from this visitor is attributed.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;

use moda_brasil_core::UserRole;

use crate::db::UserRepository;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{CurrentUser, NewProfile};
use crate::services::{ProfileService, SignInState, bind_session};
use crate::state::AppState;
use crate::storage::SessionStorage;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// `customer` (default) or `seller`.
    #[serde(default)]
    pub role: UserRole,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Handle registration.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<CurrentUser>)> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    if body.role == UserRole::Admin {
        return Err(AppError::Forbidden(
            "admin accounts cannot be self-registered".to_string(),
        ));
    }

    let account = state
        .identity()
        .create_account(&body.email, &body.password)
        .await?;

    let persistent = SessionStorage::persistent(session.clone());
    ProfileService::new(state.store())
        .create_profile(
            NewProfile {
                uid: account.uid.clone(),
                name: name.to_string(),
                email: account.email.clone(),
                role: body.role,
            },
            &persistent,
        )
        .await?;

    session.cycle_id().await?;
    let current = bind_session(state.store(), &session, SignInState::SignedIn(account))
        .await?
        .ok_or_else(|| AppError::Internal("session not bound after sign-in".to_string()))?;
    set_sentry_user(&current.uid, Some(current.email.as_str()));

    Ok((StatusCode::CREATED, Json(current)))
}

/// Handle login.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<CurrentUser>> {
    let account = state.identity().sign_in(&body.email, &body.password).await?;

    session.cycle_id().await?;
    let current = bind_session(state.store(), &session, SignInState::SignedIn(account))
        .await?
        .ok_or_else(|| AppError::Internal("session not bound after sign-in".to_string()))?;
    set_sentry_user(&current.uid, Some(current.email.as_str()));
    tracing::info!(uid = %current.uid, "User signed in");

    Ok(Json(current))
}

/// Handle logout.
///
/// Referral storage lives in the same session and is kept.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<StatusCode> {
    if let Some(user) = user {
        state.identity().sign_out(&user.uid).await?;
        tracing::info!(uid = %user.uid, "User signed out");
    }
    bind_session(state.store(), &session, SignInState::SignedOut).await?;
    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}

/// Current user with a freshly loaded profile.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CurrentUser>> {
    let profile = UserRepository::new(state.store()).get(&user.uid).await?;
    Ok(Json(CurrentUser { profile, ..user }))
}
