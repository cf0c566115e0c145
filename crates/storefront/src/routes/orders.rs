//! Checkout and order history route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tower_sessions::Session;

use moda_brasil_core::OrderId;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Order;
use crate::services::{CheckoutRequest, OrderService};
use crate::state::AppState;
use crate::storage::SessionStorage;

/// Checkout response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: OrderId,
}

/// Place an order for the signed-in customer.
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let persistent = SessionStorage::persistent(session);
    let order_id = OrderService::new(state.store())
        .checkout(
            &user,
            request,
            state.config().partner_commission_percent,
            &persistent,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(CheckoutResponse { order_id })))
}

/// The signed-in customer's orders, newest first.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.store())
        .list_for_customer(&user.uid)
        .await?;
    Ok(Json(orders))
}
