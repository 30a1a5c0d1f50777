//! Staff-side order corrections
//!
//! An already-submitted order can be corrected by the floor: quantities,
//! line notes, added and removed lines, and the order-level note. The total
//! is recomputed from the *final* surviving line set under the order's
//! pricing mode, and every touched or new line keeps the order's current
//! workflow status (a correction never moves an order through the kitchen).

use crate::db::models::{Order, OrderItem, Product};
use crate::orders::cart::{CartError, PricingMode, decimal, round_money};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text, validate_quantity};
use crate::utils::{AppError, AppResult, now_millis};
use rust_decimal::Decimal;
use shared::client::OrderEditRequest;
use std::collections::HashMap;
use surrealdb::RecordId;

/// One surviving existing row after an edit
#[derive(Debug, Clone)]
pub struct ItemUpdate {
    pub item_id: RecordId,
    pub quantity: i32,
    pub unit_price: f64,
    pub total_price: f64,
    pub notes: Option<String>,
}

/// The fully-resolved effect of an edit, ready to persist
#[derive(Debug, Clone)]
pub struct AppliedEdit {
    pub updates: Vec<ItemUpdate>,
    pub inserts: Vec<OrderItem>,
    /// Persisted rows to delete (explicit removals plus lines driven to 0)
    pub removed_item_ids: Vec<String>,
    pub total_amount: f64,
    pub notes: Option<String>,
}

/// Resolve an edit request against the current order state
///
/// Pure computation; persistence happens in the caller. Fails without any
/// side effect when the surviving line set would be empty or references an
/// unknown product.
pub fn apply_edit(
    order: &Order,
    existing_items: &[OrderItem],
    request: OrderEditRequest,
    catalog: &HashMap<String, Product>,
    mode: PricingMode,
) -> AppResult<AppliedEdit> {
    validate_optional_text(&request.notes, "order note", MAX_NOTE_LEN)?;

    let existing_ids: Vec<String> = existing_items
        .iter()
        .filter_map(|item| item.id.as_ref().map(|id| id.to_string()))
        .collect();

    let mut removed: Vec<String> = request
        .removed_item_ids
        .into_iter()
        .filter(|id| existing_ids.contains(id))
        .collect();

    let mut updates = Vec::new();
    let mut inserts = Vec::new();
    let mut total = Decimal::ZERO;

    for line in request.items {
        // Quantity 0 (or below) removes the line instead of persisting a
        // zero-quantity row
        if line.quantity <= 0 {
            if let Some(id) = line.id
                && existing_ids.contains(&id)
                && !removed.contains(&id)
            {
                removed.push(id);
            }
            continue;
        }
        validate_quantity(line.quantity, "quantity")?;
        validate_optional_text(&line.notes, "item note", MAX_NOTE_LEN)?;

        let product = catalog
            .get(&line.product_id)
            .ok_or_else(|| CartError::UnknownProduct(line.product_id.clone()))?;

        let unit = if mode.is_ayce() {
            Decimal::ZERO
        } else {
            decimal(product.price)
        };
        let line_total = unit * Decimal::from(line.quantity);
        total += line_total;

        match line.id {
            Some(id) if existing_ids.contains(&id) => {
                if removed.contains(&id) {
                    // Removal takes priority over a simultaneous update
                    continue;
                }
                let item_id: RecordId = id
                    .parse()
                    .map_err(|_| AppError::validation(format!("Invalid item ID: {}", id)))?;
                updates.push(ItemUpdate {
                    item_id,
                    quantity: line.quantity,
                    unit_price: round_money(unit),
                    total_price: round_money(line_total),
                    notes: line.notes,
                });
            }
            _ => {
                let order_id = order
                    .id
                    .clone()
                    .ok_or_else(|| AppError::internal("Order has no id"))?;
                let product_id = product.id.clone().ok_or_else(|| {
                    AppError::internal(format!("Product {} has no id", product.name))
                })?;
                inserts.push(OrderItem {
                    id: None,
                    order_id,
                    product_id,
                    quantity: line.quantity,
                    unit_price: round_money(unit),
                    total_price: round_money(line_total),
                    notes: line.notes,
                    variant_id: None,
                    // New and touched lines keep the order's current stage
                    status: order.status,
                    created_at: now_millis(),
                });
            }
        }
    }

    if updates.is_empty() && inserts.is_empty() {
        return Err(CartError::EmptyOrder.into());
    }

    let total_amount = if mode.is_ayce() {
        0.0
    } else {
        round_money(total)
    };

    Ok(AppliedEdit {
        updates,
        inserts,
        removed_item_ids: removed,
        total_amount,
        notes: request.notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::client::OrderEditLine;
    use shared::{OrderStatus, ProductStatus};

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

    fn order(status: OrderStatus) -> Order {
        Order {
            id: Some(RecordId::from_table_key("orders", "o1")),
            restaurant_id: RecordId::from_table_key("restaurants", "r1"),
            table_id: RecordId::from_table_key("tables", "t1"),
            status,
            total_amount: 16.0,
            notes: None,
            party_size: Some(2),
            payment_method: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn item(key: &str, product_key: &str, quantity: i32, unit: f64) -> OrderItem {
        OrderItem {
            id: Some(RecordId::from_table_key("order_items", key)),
            order_id: RecordId::from_table_key("orders", "o1"),
            product_id: RecordId::from_table_key("products", product_key),
            quantity,
            unit_price: unit,
            total_price: unit * quantity as f64,
            notes: None,
            variant_id: None,
            status: OrderStatus::Preparing,
            created_at: 0,
        }
    }

    fn catalog() -> HashMap<String, Product> {
        [
            ("products:p1".to_string(), product("p1", "Margherita", 8.0)),
            ("products:p2".to_string(), product("p2", "Tiramisù", 5.5)),
        ]
        .into()
    }

    #[test]
    fn edit_recomputes_total_from_surviving_lines() {
        let order = order(OrderStatus::Preparing);
        let existing = vec![item("i1", "p1", 2, 8.0)];
        let request = OrderEditRequest {
            items: vec![
                OrderEditLine {
                    id: Some("order_items:i1".to_string()),
                    product_id: "products:p1".to_string(),
                    quantity: 1,
                    notes: Some("less salt".to_string()),
                },
                OrderEditLine {
                    id: None,
                    product_id: "products:p2".to_string(),
                    quantity: 2,
                    notes: None,
                },
            ],
            removed_item_ids: vec![],
            notes: Some("table asked to split".to_string()),
        };

        let applied = apply_edit(&order, &existing, request, &catalog(), PricingMode::Standard)
            .unwrap();
        assert_eq!(applied.total_amount, 19.0); // 1×8.00 + 2×5.50
        assert_eq!(applied.updates.len(), 1);
        assert_eq!(applied.updates[0].quantity, 1);
        assert_eq!(applied.inserts.len(), 1);
        // Added lines inherit the order's current workflow status
        assert_eq!(applied.inserts[0].status, OrderStatus::Preparing);
        assert!(applied.removed_item_ids.is_empty());
    }

    #[test]
    fn removed_and_zeroed_lines_are_deleted() {
        let order = order(OrderStatus::Pending);
        let existing = vec![item("i1", "p1", 2, 8.0), item("i2", "p2", 1, 5.5)];
        let request = OrderEditRequest {
            items: vec![
                OrderEditLine {
                    id: Some("order_items:i1".to_string()),
                    product_id: "products:p1".to_string(),
                    quantity: 0, // driven to zero → removal
                    notes: None,
                },
                OrderEditLine {
                    id: Some("order_items:i2".to_string()),
                    product_id: "products:p2".to_string(),
                    quantity: 3,
                    notes: None,
                },
            ],
            removed_item_ids: vec![],
            notes: None,
        };

        let applied =
            apply_edit(&order, &existing, request, &catalog(), PricingMode::Standard).unwrap();
        assert_eq!(applied.removed_item_ids, vec!["order_items:i1".to_string()]);
        assert_eq!(applied.updates.len(), 1);
        assert_eq!(applied.total_amount, 16.5);
    }

    #[test]
    fn edit_that_empties_the_order_is_rejected() {
        let order = order(OrderStatus::Pending);
        let existing = vec![item("i1", "p1", 2, 8.0)];
        let request = OrderEditRequest {
            items: vec![OrderEditLine {
                id: Some("order_items:i1".to_string()),
                product_id: "products:p1".to_string(),
                quantity: 0,
                notes: None,
            }],
            removed_item_ids: vec![],
            notes: None,
        };

        let err =
            apply_edit(&order, &existing, request, &catalog(), PricingMode::Standard).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn ayce_edit_keeps_everything_zeroed() {
        let order = order(OrderStatus::Pending);
        let existing = vec![item("i1", "p1", 2, 0.0)];
        let request = OrderEditRequest {
            items: vec![OrderEditLine {
                id: Some("order_items:i1".to_string()),
                product_id: "products:p1".to_string(),
                quantity: 3,
                notes: None,
            }],
            removed_item_ids: vec![],
            notes: None,
        };

        let applied =
            apply_edit(&order, &existing, request, &catalog(), PricingMode::AllYouCanEat).unwrap();
        assert_eq!(applied.total_amount, 0.0);
        assert_eq!(applied.updates[0].unit_price, 0.0);
        assert_eq!(applied.updates[0].total_price, 0.0);
    }

    #[test]
    fn stale_removed_ids_are_ignored() {
        let order = order(OrderStatus::Pending);
        let existing = vec![item("i1", "p1", 2, 8.0)];
        let request = OrderEditRequest {
            items: vec![OrderEditLine {
                id: Some("order_items:i1".to_string()),
                product_id: "products:p1".to_string(),
                quantity: 2,
                notes: None,
            }],
            removed_item_ids: vec!["order_items:ghost".to_string()],
            notes: None,
        };

        let applied =
            apply_edit(&order, &existing, request, &catalog(), PricingMode::Standard).unwrap();
        assert!(applied.removed_item_ids.is_empty());
    }
}
