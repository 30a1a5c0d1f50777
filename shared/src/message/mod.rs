//! Change-feed payloads
//!
//! Every successful write to a watched resource is announced as a
//! [`ChangeEvent`]. Delivery is at-least-once and unordered across
//! resources; consumers are expected to re-fetch the affected view rather
//! than patch state from the payload (the payload is a convenience for
//! logging and lightweight consumers).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Row-level change kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeAction::Insert => f.write_str("insert"),
            ChangeAction::Update => f.write_str("update"),
            ChangeAction::Delete => f.write_str("delete"),
        }
    }
}

/// One change notification on the feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Logical resource name (`orders`, `order_items`, `waiter_calls`, ...)
    pub resource: String,
    pub action: ChangeAction,
    /// Tenant scope; subscribers filter on this
    pub restaurant_id: String,
    /// Affected row id, when a single row is concerned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_id: Option<String>,
    /// New row snapshot, best-effort
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl ChangeEvent {
    pub fn new(
        resource: impl Into<String>,
        action: ChangeAction,
        restaurant_id: impl Into<String>,
        row_id: Option<String>,
    ) -> Self {
        Self {
            resource: resource.into(),
            action,
            restaurant_id: restaurant_id.into(),
            row_id,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}
