//! Catalog products.

use serde::{Deserialize, Serialize};

use moda_brasil_core::{Money, ProductId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_price: Money,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Admin input for a new product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_price: Money,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub images: Vec<String>,
}

impl From<NewProduct> for Product {
    fn from(p: NewProduct) -> Self {
        Self {
            id: None,
            name: p.name,
            description: p.description,
            base_price: p.base_price,
            sizes: p.sizes,
            colors: p.colors,
            stock: p.stock,
            images: p.images,
        }
    }
}
