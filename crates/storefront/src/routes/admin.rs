//! Admin route handlers.
//!
//! Every handler requires an admin profile (see `RequireAdmin`).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use moda_brasil_core::{CommissionId, CommissionStatus, OrderId, OrderStatus, ProductId, UserId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{NewProduct, Order, UserProfile};
use crate::services::{CatalogService, OrderService};
use crate::state::AppState;

/// Product creation response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreated {
    pub product_id: ProductId,
}

/// Fulfillment update body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentUpdate {
    pub status: OrderStatus,
    #[serde(default)]
    pub tracking_code: Option<String>,
}

/// Commission status update body.
#[derive(Debug, Deserialize)]
pub struct CommissionUpdate {
    pub status: CommissionStatus,
}

/// Add a product.
pub async fn add_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<NewProduct>,
) -> Result<(StatusCode, Json<ProductCreated>)> {
    let product_id = CatalogService::new(state.store()).add_product(input).await?;
    Ok((StatusCode::CREATED, Json(ProductCreated { product_id })))
}

/// Delete a product.
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    CatalogService::new(state.store())
        .delete_product(&ProductId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List every user profile.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<UserProfile>>> {
    let users = CatalogService::new(state.store()).list_users().await?;
    Ok(Json(users))
}

/// Delete a user profile. Admins cannot delete their own profile.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let uid = UserId::new(id);
    if uid == admin.uid {
        return Err(AppError::BadRequest(
            "cannot delete your own profile".to_string(),
        ));
    }
    CatalogService::new(state.store()).delete_user(&uid).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List every order, newest first.
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.store()).list_all().await?;
    Ok(Json(orders))
}

/// Update an order's fulfillment status and tracking code.
pub async fn update_order(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    Json(update): Json<FulfillmentUpdate>,
) -> Result<StatusCode> {
    OrderService::new(state.store())
        .update_fulfillment(
            &OrderId::new(id),
            update.status,
            update.tracking_code.as_deref(),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move a commission to a new status.
pub async fn update_commission(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    Json(update): Json<CommissionUpdate>,
) -> Result<StatusCode> {
    CatalogService::new(state.store())
        .set_commission_status(&CommissionId::new(id), update.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
