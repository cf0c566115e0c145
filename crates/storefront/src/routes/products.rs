//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use moda_brasil_core::{ProductId, UserId};

use crate::error::{AppError, Result};
use crate::models::Product;
use crate::services::{CatalogError, CatalogService};
use crate::state::AppState;

/// Public view of a storefront partner.
#[derive(Debug, Serialize)]
pub struct SellerOption {
    pub uid: UserId,
    pub name: String,
}

/// Product listing.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = CatalogService::new(state.store()).list_products().await?;
    Ok(Json(products))
}

/// Product detail.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let id = ProductId::new(id);
    match CatalogService::new(state.store()).get_product(&id).await {
        Ok(product) => Ok(Json(product)),
        Err(CatalogError::NotFound) => Err(AppError::NotFound(format!("product {id}"))),
        Err(e) => Err(e.into()),
    }
}

/// Storefront partners a customer can credit at checkout.
pub async fn sellers(State(state): State<AppState>) -> Result<Json<Vec<SellerOption>>> {
    let sellers = CatalogService::new(state.store())
        .list_sellers()
        .await?
        .into_iter()
        .map(|p| SellerOption {
            uid: p.uid,
            name: p.name,
        })
        .collect();
    Ok(Json(sellers))
}
