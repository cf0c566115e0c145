//! Affiliate dashboard route handlers.

use axum::{Json, extract::State};
use serde::Serialize;

use moda_brasil_core::AffiliateCode;
use moda_brasil_core::affiliate::affiliate_link;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::{AffiliateStats, AffiliateStatsService, best_effort};
use crate::state::AppState;

/// Shareable affiliate link.
#[derive(Debug, Serialize)]
pub struct AffiliateLink {
    pub code: AffiliateCode,
    pub link: String,
}

/// Affiliate statistics for the signed-in user.
///
/// A failed query is logged and answered with `null` so the dashboard can
/// still render.
pub async fn stats(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Json<Option<AffiliateStats>> {
    let stats = AffiliateStatsService::new(state.store())
        .stats(&user.uid)
        .await;
    Json(best_effort("loading affiliate stats", stats))
}

/// The signed-in user's affiliate link.
pub async fn link(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<AffiliateLink>> {
    let code = UserRepository::new(state.store())
        .get(&user.uid)
        .await?
        .and_then(|p| p.affiliate_code)
        .ok_or_else(|| AppError::NotFound("no affiliate code for this account".to_string()))?;

    Ok(Json(AffiliateLink {
        link: affiliate_link(&state.config().base_url, &code),
        code,
    }))
}
