//! Order Model
//!
//! 订单主表 + 订单行。行的状态镜像订单状态（每次转换后同步写入）。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::{OrderStatus, PaymentMethod};
use surrealdb::RecordId;

// =============================================================================
// Order (主表)
// =============================================================================

/// Order entity: one customer submission at a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant_id: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub table_id: RecordId,
    pub status: OrderStatus,
    /// Always recomputed from the surviving line set; 0 under AYCE
    pub total_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    pub created_at: i64,
    pub updated_at: i64,
}

// =============================================================================
// Order Item (订单行)
// =============================================================================

/// Order item entity: one product line within an order
///
/// `total_price` is always `unit_price × quantity` (0 under AYCE); it is
/// recomputed server-side and never trusted from clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub order_id: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub product_id: RecordId,
    pub quantity: i32,
    pub unit_price: f64,
    pub total_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Optional variant reference
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub variant_id: Option<RecordId>,
    /// Mirrors the parent order's status at the time of the last sync
    pub status: OrderStatus,
    pub created_at: i64,
}

// =============================================================================
// API Response Types
// =============================================================================

/// Order with its lines, for staff views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    /// Table display name, resolved for convenience
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
}
