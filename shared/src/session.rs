//! Table-session token contract
//!
//! A table token is a time-boxed bearer credential binding one customer
//! browsing session to one physical table. Every rejection reason maps to a
//! distinct customer-facing message; the customer page shows these verbatim
//! on the invalid-QR screen.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a token failed validation
///
/// The reason → message mapping is a first-class contract, not incidental:
/// "ask the staff for a new code" (revoked/expired) reads very differently
/// from "this QR was never valid" (not found / mismatch).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(rename_all = "snake_case")]
pub enum TokenRejection {
    /// No token in the request at all; no lookup is attempted
    #[error("This QR code is not valid. Please ask the staff for a new one.")]
    Missing,
    /// Token string unknown to the store
    #[error("This QR code is not valid. Please ask the staff for a new one.")]
    NotFound,
    /// Token belongs to a different restaurant than the URL claims
    #[error("This QR code belongs to a different restaurant. Please scan the code on your table.")]
    RestaurantMismatch,
    /// Token belongs to a different table than the URL claims
    #[error("This QR code belongs to a different table. Please scan the code on your table.")]
    TableMismatch,
    /// Past the 2-hour validity window
    #[error("This QR code has expired. Please ask the staff for a new one.")]
    Expired,
    /// Superseded by a newer scan or invalidated when the bill was settled
    #[error("This QR code has been regenerated. Please ask the staff for a new one.")]
    Revoked,
}

impl TokenRejection {
    /// Stable machine-readable code for clients
    pub fn code(self) -> &'static str {
        match self {
            TokenRejection::Missing => "token_missing",
            TokenRejection::NotFound => "token_not_found",
            TokenRejection::RestaurantMismatch => "token_restaurant_mismatch",
            TokenRejection::TableMismatch => "token_table_mismatch",
            TokenRejection::Expired => "token_expired",
            TokenRejection::Revoked => "token_revoked",
        }
    }
}

/// A validated table session, returned by the session gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSession {
    /// Token row id (`table_token:...`)
    pub token_id: String,
    pub restaurant_id: String,
    pub table_id: String,
    /// Expiry, unix millis
    pub expires_at: i64,
    /// Party size recorded for this session, if any
    pub guest_count: Option<i32>,
}

/// Result of issuing a fresh token on a QR scan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    /// Customer-menu URL carrying the token in its query string
    pub redirect_url: String,
    pub token: String,
    /// Expiry, unix millis
    pub expires_at: i64,
}
