//! Referral capture route handler.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header::USER_AGENT},
};
use tower_sessions::Session;

use moda_brasil_core::ReferralLocation;

use crate::middleware::VisitId;
use crate::services::{CaptureOutcome, ReferralCapture};
use crate::state::AppState;
use crate::storage::SessionStorage;

/// Capture a referral code for the page the visitor is on.
///
/// Called by the client on every navigation. Never fails: storage and store
/// errors are logged inside the capture.
pub async fn capture(
    State(state): State<AppState>,
    session: Session,
    visit: VisitId,
    headers: HeaderMap,
    Json(location): Json<ReferralLocation>,
) -> Json<CaptureOutcome> {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let persistent = SessionStorage::persistent(session.clone());
    let visit = SessionStorage::visit(session, &visit);
    let outcome = ReferralCapture::new(state.store())
        .capture(&location, user_agent, &persistent, &visit)
        .await;

    Json(outcome)
}
