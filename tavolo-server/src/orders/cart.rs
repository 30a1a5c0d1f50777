//! Order cart — pricing and AYCE limit rules
//!
//! The cart is the in-progress order. Totals are computed with `Decimal`
//! internally (2 dp, half-up) and converted to `f64` only at the storage
//! boundary. Prices always come from the product catalog; anything a client
//! claims about prices is ignored.
//!
//! Pricing regimes:
//! - **Standard**: total = Σ unit_price × quantity over lines with qty > 0
//! - **AYCE**: every unit price, line total and the order total are forced
//!   to 0 — the guest is billed per person via the restaurant's fixed
//!   lunch/dinner price, out of band. Line quantities still matter for the
//!   kitchen and for the per-product AYCE limits.

use crate::db::models::{Order, OrderItem, Product, Restaurant};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text, validate_quantity};
use crate::utils::{AppError, now_millis};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use shared::OrderStatus;
use shared::client::CartItemInput;
use std::collections::HashMap;
use surrealdb::RecordId;
use thiserror::Error;

/// Rounding: 2 decimal places, half-up
const DECIMAL_PLACES: u32 = 2;

// ============================================================================
// Pricing mode
// ============================================================================

/// Which pricing regime applies to an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingMode {
    Standard,
    AllYouCanEat,
}

impl PricingMode {
    /// AYCE is active when the flag is set and at least one fixed price
    /// (lunch or dinner) exists
    pub fn for_restaurant(restaurant: &Restaurant) -> Self {
        if restaurant.ayce_active() {
            PricingMode::AllYouCanEat
        } else {
            PricingMode::Standard
        }
    }

    pub fn is_ayce(self) -> bool {
        matches!(self, PricingMode::AllYouCanEat)
    }
}

// ============================================================================
// Cart errors
// ============================================================================

/// Cart-level validation failures; each carries its customer-facing message
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("An order must contain at least one item.")]
    EmptyOrder,

    #[error("You can order at most {limit} pieces of {product} with the All You Can Eat plan.")]
    LimitReached { product: String, limit: i32 },

    #[error("The limit for {product} is {limit} pieces with the All You Can Eat plan.")]
    LimitExceeded { product: String, limit: i32 },

    #[error("Product {0} is not on the menu.")]
    UnknownProduct(String),

    #[error("{0} is currently not available.")]
    ProductUnavailable(String),
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        AppError::Validation(err.to_string())
    }
}

// ============================================================================
// Cart
// ============================================================================

/// One line of the cart
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product_id: RecordId,
    pub product_name: String,
    pub quantity: i32,
    /// Catalog unit price (pre-AYCE-zeroing)
    pub catalog_price: Decimal,
    /// Effective AYCE limit of the product, if any
    pub ayce_limit: Option<i32>,
    pub notes: Option<String>,
    pub variant_id: Option<RecordId>,
}

/// The in-progress order
#[derive(Debug, Clone)]
pub struct OrderCart {
    mode: PricingMode,
    lines: Vec<CartLine>,
}

impl OrderCart {
    pub fn new(mode: PricingMode) -> Self {
        Self {
            mode,
            lines: Vec::new(),
        }
    }

    pub fn mode(&self) -> PricingMode {
        self.mode
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Add one unit of a product
    ///
    /// Under AYCE, adding beyond the product's limit is rejected and the
    /// cart is left unchanged.
    pub fn add(&mut self, product: &Product) -> Result<(), CartError> {
        let limit = self.effective_limit(product);
        let current = self.quantity_of(product);
        if let Some(limit) = limit
            && current >= limit
        {
            return Err(CartError::LimitReached {
                product: product.name.clone(),
                limit,
            });
        }

        if let Some(line) = self.line_of_mut(product) {
            line.quantity += 1;
            return Ok(());
        }
        let product_id = product
            .id
            .clone()
            .ok_or_else(|| CartError::UnknownProduct(product.name.clone()))?;
        self.lines.push(CartLine {
            product_id,
            product_name: product.name.clone(),
            quantity: 1,
            catalog_price: decimal(product.price),
            ayce_limit: product.ayce_limit(),
            notes: None,
            variant_id: None,
        });
        Ok(())
    }

    /// Set a line's quantity directly (stepper / numeric input)
    ///
    /// Quantity ≤ 0 removes the line. Under AYCE, a request above the limit
    /// is rejected and the previous quantity is kept.
    pub fn set_quantity(&mut self, product: &Product, quantity: i32) -> Result<(), CartError> {
        if quantity <= 0 {
            let id = product
                .id
                .clone()
                .ok_or_else(|| CartError::UnknownProduct(product.name.clone()))?;
            self.lines.retain(|line| line.product_id != id);
            return Ok(());
        }
        if let Some(limit) = self.effective_limit(product)
            && quantity > limit
        {
            return Err(CartError::LimitExceeded {
                product: product.name.clone(),
                limit,
            });
        }
        match self.line_of_mut(product) {
            Some(line) => line.quantity = quantity,
            None => {
                self.add(product)?;
                // add() created the line with quantity 1
                if let Some(line) = self.line_of_mut(product) {
                    line.quantity = quantity;
                }
            }
        }
        Ok(())
    }

    /// Build a cart from a customer submission
    ///
    /// Duplicate product lines are merged before the AYCE limit check, so a
    /// split submission cannot sneak past a limit.
    pub fn from_submission(
        mode: PricingMode,
        inputs: &[CartItemInput],
        catalog: &HashMap<String, Product>,
    ) -> Result<Self, AppError> {
        let mut cart = Self::new(mode);
        for input in inputs {
            let product = catalog
                .get(&input.product_id)
                .ok_or_else(|| CartError::UnknownProduct(input.product_id.clone()))?;
            if product.status != shared::ProductStatus::Available {
                return Err(CartError::ProductUnavailable(product.name.clone()).into());
            }
            validate_quantity(input.quantity, "quantity")?;
            validate_optional_text(&input.notes, "item note", MAX_NOTE_LEN)?;

            let target = cart.quantity_of(product) + input.quantity;
            cart.set_quantity(product, target)
                .map_err(|err| match err {
                    // A cumulative overflow reads as "limit reached" to the
                    // customer, matching the add-one path
                    CartError::LimitExceeded { product, limit } => {
                        CartError::LimitReached { product, limit }
                    }
                    other => other,
                })?;
            if let Some(line) = cart.line_of_mut(product) {
                line.notes = input.notes.clone();
                line.variant_id = input
                    .variant_id
                    .as_deref()
                    .and_then(|id| id.parse().ok());
            }
        }
        cart.require_non_empty()?;
        Ok(cart)
    }

    /// Non-empty invariant: at least one line with quantity > 0
    pub fn require_non_empty(&self) -> Result<(), CartError> {
        if self.lines.iter().any(|line| line.quantity > 0) {
            Ok(())
        } else {
            Err(CartError::EmptyOrder)
        }
    }

    /// Effective unit price of a line under the cart's pricing mode
    pub fn unit_price(&self, line: &CartLine) -> Decimal {
        if self.mode.is_ayce() {
            Decimal::ZERO
        } else {
            line.catalog_price
        }
    }

    /// Line total = unit price × quantity (0 under AYCE)
    pub fn line_total(&self, line: &CartLine) -> Decimal {
        self.unit_price(line) * Decimal::from(line.quantity)
    }

    /// Order total under the cart's pricing mode
    pub fn total(&self) -> Decimal {
        if self.mode.is_ayce() {
            return Decimal::ZERO;
        }
        self.lines
            .iter()
            .filter(|line| line.quantity > 0)
            .map(|line| self.line_total(line))
            .sum()
    }

    /// Materialize the cart into storable order rows
    pub fn into_rows(
        self,
        restaurant_id: RecordId,
        table_id: RecordId,
        party_size: i32,
        notes: Option<String>,
    ) -> (Order, Vec<OrderItem>) {
        let now = now_millis();
        let total = round_money(self.total());
        let items = self
            .lines
            .iter()
            .filter(|line| line.quantity > 0)
            .map(|line| OrderItem {
                id: None,
                // Overwritten with the real order id at persist time
                order_id: RecordId::from_table_key("orders", "pending"),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_price: round_money(self.unit_price(line)),
                total_price: round_money(self.line_total(line)),
                notes: line.notes.clone(),
                variant_id: line.variant_id.clone(),
                status: OrderStatus::Pending,
                created_at: now,
            })
            .collect();

        let order = Order {
            id: None,
            restaurant_id,
            table_id,
            status: OrderStatus::Pending,
            total_amount: total,
            notes,
            party_size: Some(party_size),
            payment_method: None,
            created_at: now,
            updated_at: now,
        };
        (order, items)
    }

    fn quantity_of(&self, product: &Product) -> i32 {
        self.lines
            .iter()
            .filter(|line| Some(&line.product_id) == product.id.as_ref())
            .map(|line| line.quantity)
            .sum()
    }

    fn line_of_mut(&mut self, product: &Product) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| Some(&line.product_id) == product.id.as_ref())
    }

    /// AYCE limits only bind while AYCE pricing is active
    fn effective_limit(&self, product: &Product) -> Option<i32> {
        if self.mode.is_ayce() {
            product.ayce_limit()
        } else {
            None
        }
    }
}

// ============================================================================
// Money helpers
// ============================================================================

/// f64 → Decimal at the storage boundary
pub fn decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Decimal → f64, rounded to 2 dp half-up
pub fn round_money(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(
            DECIMAL_PLACES,
            rust_decimal::RoundingStrategy::MidpointAwayFromZero,
        )
        .to_f64()
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ProductStatus;

    fn product(key: &str, name: &str, price: f64) -> Product {
        Product {
            id: Some(RecordId::from_table_key("products", key)),
            restaurant_id: RecordId::from_table_key("restaurants", "r1"),
            category_id: RecordId::from_table_key("categories", "c1"),
            name: name.to_string(),
            description: None,
            price,
            image_url: None,
            status: ProductStatus::Available,
            display_order: 0,
            ayce_limit_enabled: false,
            ayce_limit_quantity: None,
        }
    }

    fn limited_product(key: &str, name: &str, price: f64, limit: i32) -> Product {
        let mut p = product(key, name, price);
        p.ayce_limit_enabled = true;
        p.ayce_limit_quantity = Some(limit);
        p
    }

    #[test]
    fn standard_total_is_sum_of_lines_regardless_of_insertion_order() {
        let margherita = product("p1", "Margherita", 8.0);
        let tiramisu = product("p2", "Tiramisù", 5.5);

        let mut forward = OrderCart::new(PricingMode::Standard);
        forward.add(&margherita).unwrap();
        forward.add(&margherita).unwrap();
        forward.add(&tiramisu).unwrap();

        let mut backward = OrderCart::new(PricingMode::Standard);
        backward.add(&tiramisu).unwrap();
        backward.add(&margherita).unwrap();
        backward.add(&margherita).unwrap();

        assert_eq!(forward.total(), Decimal::new(2150, 2));
        assert_eq!(forward.total(), backward.total());
    }

    #[test]
    fn ayce_zeroes_every_price() {
        let margherita = product("p1", "Margherita", 8.0);
        let mut cart = OrderCart::new(PricingMode::AllYouCanEat);
        cart.add(&margherita).unwrap();
        cart.set_quantity(&margherita, 4).unwrap();

        assert_eq!(cart.total(), Decimal::ZERO);
        for line in cart.lines() {
            assert_eq!(cart.unit_price(line), Decimal::ZERO);
            assert_eq!(cart.line_total(line), Decimal::ZERO);
        }

        let (order, items) = cart.into_rows(
            RecordId::from_table_key("restaurants", "r1"),
            RecordId::from_table_key("tables", "t1"),
            2,
            None,
        );
        assert_eq!(order.total_amount, 0.0);
        assert!(items.iter().all(|i| i.unit_price == 0.0 && i.total_price == 0.0));
        assert_eq!(items[0].quantity, 4); // quantities survive for the kitchen
    }

    #[test]
    fn ayce_limit_blocks_the_next_unit() {
        let nigiri = limited_product("p1", "Nigiri", 3.0, 2);
        let mut cart = OrderCart::new(PricingMode::AllYouCanEat);
        cart.add(&nigiri).unwrap();
        cart.add(&nigiri).unwrap();

        let err = cart.add(&nigiri).unwrap_err();
        assert_eq!(
            err,
            CartError::LimitReached {
                product: "Nigiri".to_string(),
                limit: 2
            }
        );
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn ayce_limit_rejects_direct_quantity_above_limit() {
        let nigiri = limited_product("p1", "Nigiri", 3.0, 2);
        let mut cart = OrderCart::new(PricingMode::AllYouCanEat);
        cart.set_quantity(&nigiri, 2).unwrap();

        let err = cart.set_quantity(&nigiri, 5).unwrap_err();
        assert_eq!(
            err,
            CartError::LimitExceeded {
                product: "Nigiri".to_string(),
                limit: 2
            }
        );
        // Previous quantity unchanged
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn limits_do_not_bind_outside_ayce() {
        let nigiri = limited_product("p1", "Nigiri", 3.0, 2);
        let mut cart = OrderCart::new(PricingMode::Standard);
        cart.set_quantity(&nigiri, 10).unwrap();
        assert_eq!(cart.lines()[0].quantity, 10);
    }

    #[test]
    fn quantity_zero_removes_the_line() {
        let margherita = product("p1", "Margherita", 8.0);
        let mut cart = OrderCart::new(PricingMode::Standard);
        cart.add(&margherita).unwrap();
        cart.set_quantity(&margherita, 0).unwrap();
        assert!(cart.lines().is_empty());
        assert_eq!(cart.require_non_empty(), Err(CartError::EmptyOrder));
    }

    #[test]
    fn submission_merges_duplicate_lines_before_the_limit_check() {
        let nigiri = limited_product("p1", "Nigiri", 3.0, 2);
        let catalog: HashMap<String, Product> =
            [(nigiri.id.clone().unwrap().to_string(), nigiri)].into();

        let inputs = vec![
            CartItemInput {
                product_id: "products:p1".to_string(),
                quantity: 1,
                notes: None,
                variant_id: None,
            },
            CartItemInput {
                product_id: "products:p1".to_string(),
                quantity: 2,
                notes: None,
                variant_id: None,
            },
        ];
        let err = OrderCart::from_submission(PricingMode::AllYouCanEat, &inputs, &catalog)
            .unwrap_err();
        assert!(err.to_string().contains("at most 2 pieces"));
    }

    #[test]
    fn submission_recomputes_prices_from_the_catalog() {
        let margherita = product("p1", "Margherita", 8.0);
        let tiramisu = product("p2", "Tiramisù", 5.5);
        let catalog: HashMap<String, Product> = [
            ("products:p1".to_string(), margherita),
            ("products:p2".to_string(), tiramisu),
        ]
        .into();

        let inputs = vec![
            CartItemInput {
                product_id: "products:p1".to_string(),
                quantity: 2,
                notes: Some("no basil".to_string()),
                variant_id: None,
            },
            CartItemInput {
                product_id: "products:p2".to_string(),
                quantity: 1,
                notes: None,
                variant_id: None,
            },
        ];
        let cart = OrderCart::from_submission(PricingMode::Standard, &inputs, &catalog).unwrap();
        assert_eq!(cart.total(), Decimal::new(2150, 2));

        let (order, items) = cart.into_rows(
            RecordId::from_table_key("restaurants", "r1"),
            RecordId::from_table_key("tables", "t1"),
            2,
            Some("birthday".to_string()),
        );
        assert_eq!(order.total_amount, 21.5);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.party_size, Some(2));
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.status == OrderStatus::Pending));
        let margherita_line = items.iter().find(|i| i.quantity == 2).unwrap();
        assert_eq!(margherita_line.unit_price, 8.0);
        assert_eq!(margherita_line.total_price, 16.0);
        assert_eq!(margherita_line.notes.as_deref(), Some("no basil"));
    }

    #[test]
    fn unknown_and_unavailable_products_are_rejected() {
        let mut off_menu = product("p1", "Spare ribs", 12.0);
        off_menu.status = ProductStatus::Unavailable;
        let catalog: HashMap<String, Product> =
            [("products:p1".to_string(), off_menu)].into();

        let unknown = vec![CartItemInput {
            product_id: "products:ghost".to_string(),
            quantity: 1,
            notes: None,
            variant_id: None,
        }];
        assert!(OrderCart::from_submission(PricingMode::Standard, &unknown, &catalog).is_err());

        let unavailable = vec![CartItemInput {
            product_id: "products:p1".to_string(),
            quantity: 1,
            notes: None,
            variant_id: None,
        }];
        let err = OrderCart::from_submission(PricingMode::Standard, &unavailable, &catalog)
            .unwrap_err();
        assert!(err.to_string().contains("not available"));
    }

    #[test]
    fn empty_submission_fails_before_any_write() {
        let catalog = HashMap::new();
        let err = OrderCart::from_submission(PricingMode::Standard, &[], &catalog).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
