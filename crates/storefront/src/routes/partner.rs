//! Storefront partner route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use moda_brasil_core::{Money, ProductId, WithdrawalId};

use crate::error::Result;
use crate::middleware::RequireSeller;
use crate::models::{Order, WithdrawalRequest};
use crate::services::{OrderService, PartnerService, PartnerSummary, ProductLink};
use crate::state::AppState;

/// Withdrawal request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalBody {
    pub amount: Money,
    pub pix_key: String,
}

/// Withdrawal response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalCreated {
    pub withdrawal_id: WithdrawalId,
}

/// Orders credited to the partner.
pub async fn orders(
    State(state): State<AppState>,
    RequireSeller(partner): RequireSeller,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.store())
        .list_for_seller(&partner.uid)
        .await?;
    Ok(Json(orders))
}

/// Commission totals.
pub async fn summary(
    State(state): State<AppState>,
    RequireSeller(partner): RequireSeller,
) -> Result<Json<PartnerSummary>> {
    let summary = PartnerService::new(state.store()).summary(&partner).await?;
    Ok(Json(summary))
}

/// Share link for a product.
pub async fn product_link(
    State(state): State<AppState>,
    RequireSeller(partner): RequireSeller,
    Path(id): Path<String>,
) -> Result<Json<ProductLink>> {
    let link = PartnerService::new(state.store())
        .product_link(
            &partner,
            &ProductId::new(id),
            &state.config().base_url,
            state.config().partner_commission_percent,
        )
        .await?;
    Ok(Json(link))
}

/// The partner's withdrawal requests.
pub async fn withdrawals(
    State(state): State<AppState>,
    RequireSeller(partner): RequireSeller,
) -> Result<Json<Vec<WithdrawalRequest>>> {
    let requests = PartnerService::new(state.store())
        .withdrawals(&partner)
        .await?;
    Ok(Json(requests))
}

/// Request a withdrawal.
pub async fn request_withdrawal(
    State(state): State<AppState>,
    RequireSeller(partner): RequireSeller,
    Json(body): Json<WithdrawalBody>,
) -> Result<(StatusCode, Json<WithdrawalCreated>)> {
    let withdrawal_id = PartnerService::new(state.store())
        .request_withdrawal(&partner, body.amount, &body.pix_key)
        .await?;
    Ok((StatusCode::CREATED, Json(WithdrawalCreated { withdrawal_id })))
}
