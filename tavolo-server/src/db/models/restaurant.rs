//! Restaurant Model (tenant root)

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Restaurant entity
///
/// Carries the pricing-mode flags read by the order cart and the session
/// gate: AYCE enablement with lunch/dinner fixed prices, prepayment flag,
/// and the order cooldown window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,

    // === Pricing mode flags ===
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub all_you_can_eat_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_you_can_eat_lunch_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_you_can_eat_dinner_price: Option<f64>,

    // === Ordering behavior flags ===
    /// Persisted and surfaced to the menu; no customer-side gating
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub prepayment_required: bool,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub order_cooldown_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_cooldown_minutes: Option<i32>,

    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Restaurant {
    /// Whether AYCE pricing applies: the flag is on and at least one of the
    /// lunch/dinner fixed prices is set
    pub fn ayce_active(&self) -> bool {
        self.all_you_can_eat_enabled
            && (self.all_you_can_eat_lunch_price.is_some()
                || self.all_you_can_eat_dinner_price.is_some())
    }

    /// Cooldown window in minutes, when enabled with a positive value
    pub fn cooldown_minutes(&self) -> Option<i64> {
        if !self.order_cooldown_enabled {
            return None;
        }
        self.order_cooldown_minutes
            .filter(|m| *m > 0)
            .map(i64::from)
    }
}

/// Create restaurant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantCreate {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}
