//! Core enums shared across the stack
//!
//! Statuses, roles and payment methods are closed enums end-to-end; an
//! unknown string fails at deserialization instead of flowing through as
//! dynamic data.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Order Status
// ============================================================================

/// Order lifecycle status, mirrored onto every line item
///
/// The chain is forward-only: `pending → preparing → ready → served → paid`.
/// `paid` is terminal. Payment is allowed from any non-paid status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Served,
    Paid,
}

impl OrderStatus {
    /// Statuses considered open on the floor (everything but `paid`)
    pub const OPEN: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Served,
    ];

    /// The single allowed forward step, if any
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Served),
            OrderStatus::Served => Some(OrderStatus::Paid),
            OrderStatus::Paid => None,
        }
    }

    /// Whether `target` is a legal transition from `self`
    ///
    /// Forward-only: the kitchen/floor chain advances one step at a time,
    /// while `paid` is reachable from any non-terminal status (settling a
    /// bill does not require the food to have been marked served first).
    pub fn allows(self, target: OrderStatus) -> bool {
        if self == OrderStatus::Paid {
            return false;
        }
        if target == OrderStatus::Paid {
            return true;
        }
        self.next() == Some(target)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Paid)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
            OrderStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Payment Method
// ============================================================================

/// Payment method recorded when an order is settled
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => f.write_str("cash"),
            PaymentMethod::Card => f.write_str("card"),
        }
    }
}

// ============================================================================
// Product Status
// ============================================================================

/// Menu availability flag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Available,
    Unavailable,
}

// ============================================================================
// Waiter Call Status
// ============================================================================

/// Waiter call status: `active → resolved`, one-way
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    #[default]
    Active,
    Resolved,
}

// ============================================================================
// Staff Role
// ============================================================================

/// Staff role carried in JWT claims
///
/// `kitchen` is deliberately narrower than `floor`: the kitchen terminal may
/// start preparation and mark orders ready, but delivery and payment belong
/// to the floor. The restriction is enforced in the order workflow, not by
/// hiding buttons.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Admin,
    Manager,
    Floor,
    Kitchen,
}

impl StaffRole {
    pub fn as_str(self) -> &'static str {
        match self {
            StaffRole::Admin => "admin",
            StaffRole::Manager => "manager",
            StaffRole::Floor => "floor",
            StaffRole::Kitchen => "kitchen",
        }
    }

    /// Roles allowed to manage tables, products and staff settings
    pub fn can_manage(self) -> bool {
        matches!(self, StaffRole::Admin | StaffRole::Manager)
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_chain_is_forward_only() {
        assert!(OrderStatus::Pending.allows(OrderStatus::Preparing));
        assert!(OrderStatus::Preparing.allows(OrderStatus::Ready));
        assert!(OrderStatus::Ready.allows(OrderStatus::Served));
        assert!(!OrderStatus::Ready.allows(OrderStatus::Preparing));
        assert!(!OrderStatus::Served.allows(OrderStatus::Ready));
        assert!(!OrderStatus::Pending.allows(OrderStatus::Ready)); // no skipping
    }

    #[test]
    fn paid_is_terminal_and_reachable_from_any_open_status() {
        for status in OrderStatus::OPEN {
            assert!(status.allows(OrderStatus::Paid), "{status} should allow paid");
        }
        assert!(!OrderStatus::Paid.allows(OrderStatus::Pending));
        assert!(!OrderStatus::Paid.allows(OrderStatus::Paid));
        assert_eq!(OrderStatus::Paid.next(), None);
    }

    #[test]
    fn statuses_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Preparing).unwrap(),
            "\"preparing\""
        );
        assert_eq!(
            serde_json::from_str::<PaymentMethod>("\"cash\"").unwrap(),
            PaymentMethod::Cash
        );
    }
}
