//! Request/response DTOs shared between the server and its clients

use crate::types::{OrderStatus, PaymentMethod, StaffRole};
use serde::{Deserialize, Serialize};

// ==================== Staff Auth ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub staff: StaffInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffInfo {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub role: StaffRole,
    pub restaurant_id: Option<String>,
}

// ==================== Customer Ordering ====================

/// One cart line as submitted by the customer
///
/// Prices are intentionally absent: the server recomputes every unit and
/// line total from the product catalog and ignores anything the client
/// might claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemInput {
    pub product_id: String,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Optional variant reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<CartItemInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Party size for this submission; falls back to the value stored on the
    /// session when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_size: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartySizeRequest {
    pub party_size: i32,
}

// ==================== Staff Order Operations ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayRequest {
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseTableRequest {
    pub payment_method: PaymentMethod,
}

/// One line of a staff-side order correction
///
/// `id` present = an existing persisted row; absent = a line added during
/// the edit. Lines driven to quantity 0 are removed, not kept as zero rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEditLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub product_id: String,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEditRequest {
    pub items: Vec<OrderEditLine>,
    /// Persisted item row ids removed during the edit (deleted, not zeroed)
    #[serde(default)]
    pub removed_item_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ==================== QR Issuance ====================

/// JSON body returned by the QR endpoint when the caller asked for JSON
/// (`Accept: application/json` or `X-Requested-With: XMLHttpRequest`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrIssueResponse {
    pub redirect_url: String,
    pub token: String,
}
