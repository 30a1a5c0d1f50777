//! Table session management
//!
//! 扫码 → 发放令牌 → 校验 → 吊销 的完整生命周期：
//!
//! - [`TokenService`] — 令牌的发放、校验与吊销
//! - [`SessionGate`] — 顾客会话准入与就餐人数门禁
//!
//! A table token is the only credential a customer ever holds; when the bill
//! is settled the tokens are revoked and the next seating must scan again.

pub mod gate;
pub mod token;

pub use gate::{MAX_PARTY_SIZE, MIN_PARTY_SIZE, SessionGate};
pub use token::{TOKEN_TTL_MILLIS, TokenService};
