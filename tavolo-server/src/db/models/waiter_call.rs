//! Waiter Call Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::CallStatus;
use surrealdb::RecordId;

/// Waiter call entity: a service request raised from a table
///
/// Created by the customer, resolved by staff, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaiterCall {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant_id: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub table_id: RecordId,
    #[serde(default)]
    pub status: CallStatus,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<i64>,
}
