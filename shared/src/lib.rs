//! Shared types for the Tavolo platform
//!
//! Wire-level types used by the server and its clients: order/role/payment
//! enums, the table-token rejection taxonomy, request/response DTOs and
//! change-feed payloads.

pub mod client;
pub mod message;
pub mod session;
pub mod types;

// Re-exports
pub use message::{ChangeAction, ChangeEvent};
pub use session::{IssuedToken, TableSession, TokenRejection};
pub use types::{CallStatus, OrderStatus, PaymentMethod, ProductStatus, StaffRole};
