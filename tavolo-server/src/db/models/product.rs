//! Product Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::ProductStatus;
use surrealdb::RecordId;

/// Product entity (menu item)
///
/// `ayce_limit_quantity` must be a positive integer whenever
/// `ayce_limit_enabled` is set; this is validated on every write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant_id: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub category_id: RecordId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub display_order: i32,

    // === AYCE per-guest limit ===
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub ayce_limit_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ayce_limit_quantity: Option<i32>,
}

impl Product {
    /// Effective AYCE limit: positive quantity with the flag set
    pub fn ayce_limit(&self) -> Option<i32> {
        if !self.ayce_limit_enabled {
            return None;
        }
        self.ayce_limit_quantity.filter(|q| *q > 0)
    }
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub display_order: Option<i32>,
    pub ayce_limit_enabled: Option<bool>,
    pub ayce_limit_quantity: Option<i32>,
}

/// Update product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ayce_limit_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ayce_limit_quantity: Option<i32>,
}
