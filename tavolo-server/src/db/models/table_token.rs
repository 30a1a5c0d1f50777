//! Table Token Model
//!
//! 桌台会话令牌 — 绑定一次扫码会话到一张桌台。
//! 令牌从不删除，只打 revoked 标记，保留审计记录。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Table token entity
///
/// At most one non-revoked, non-expired token is authoritative per table:
/// issuing a new one revokes all predecessors first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableToken {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant_id: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub table_id: RecordId,
    /// Opaque bearer token string
    pub token: String,
    /// Expiry, unix millis
    pub expires_at: i64,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub revoked: bool,
    /// Party size recorded for this session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_count: Option<i32>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<i64>,
}
