//! Order Repository
//!
//! Orders and their line items. Multi-row sequences (order + items, bulk
//! status sync) are separate sequential writes with no surrounding
//! transaction — a mid-sequence failure leaves a part-updated state that the
//! next refetch reconciles.

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{DiningTable, Order, OrderDetail, OrderItem};
use shared::{OrderStatus, PaymentMethod};
use std::collections::HashMap;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const TABLE: &str = "orders";
const ITEMS_TABLE: &str = "order_items";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Persist an order and its line items
    ///
    /// Two write steps: the order row first, then the items. Items carry the
    /// freshly-created order id.
    pub async fn create_with_items(
        &self,
        order: Order,
        items: Vec<OrderItem>,
    ) -> RepoResult<OrderDetail> {
        let created: Option<Order> = self.base.db().create(TABLE).content(order).await?;
        let order =
            created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))?;
        let order_id = order
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Created order has no id".to_string()))?;

        let mut created_items = Vec::with_capacity(items.len());
        for mut item in items {
            item.order_id = order_id.clone();
            let created: Option<OrderItem> =
                self.base.db().create(ITEMS_TABLE).content(item).await?;
            created_items.push(
                created
                    .ok_or_else(|| RepoError::Database("Failed to create order item".to_string()))?,
            );
        }

        Ok(OrderDetail {
            order,
            items: created_items,
            table_name: None,
        })
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let thing = parse_record_id(id, "order")?;
        let order: Option<Order> = self.base.db().select(thing).await?;
        Ok(order)
    }

    /// Find the line items of an order
    pub async fn find_items(&self, order_id: &str) -> RepoResult<Vec<OrderItem>> {
        let items: Vec<OrderItem> = self
            .base
            .db()
            .query("SELECT * FROM order_items WHERE order_id = $oid ORDER BY created_at")
            .bind(("oid", order_id.to_string()))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Find one order with its items
    pub async fn find_detail(&self, id: &str) -> RepoResult<Option<OrderDetail>> {
        let Some(order) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let items = self.find_items(id).await?;
        Ok(Some(OrderDetail {
            order,
            items,
            table_name: None,
        }))
    }

    /// Active orders of a restaurant (given statuses), newest first, with
    /// items and resolved table names
    pub async fn find_for_restaurant(
        &self,
        restaurant_id: &str,
        statuses: &[OrderStatus],
    ) -> RepoResult<Vec<OrderDetail>> {
        let status_strings: Vec<String> =
            statuses.iter().map(|s| s.as_str().to_string()).collect();
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM orders WHERE restaurant_id = $rid AND status IN $statuses \
                 ORDER BY created_at DESC",
            )
            .bind(("rid", restaurant_id.to_string()))
            .bind(("statuses", status_strings))
            .await?
            .take(0)?;

        self.attach_items(orders).await
    }

    /// Open (non-paid) orders of one table
    pub async fn find_open_for_table(
        &self,
        restaurant_id: &str,
        table_id: &str,
    ) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM orders WHERE restaurant_id = $rid AND table_id = $tid \
                 AND status != $paid ORDER BY created_at",
            )
            .bind(("rid", restaurant_id.to_string()))
            .bind(("tid", table_id.to_string()))
            .bind(("paid", OrderStatus::Paid.as_str()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Creation time of the most recent order at a table, if any
    ///
    /// Used by the session gate for the order-cooldown window.
    pub async fn latest_order_millis_for_table(
        &self,
        restaurant_id: &str,
        table_id: &str,
    ) -> RepoResult<Option<i64>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT created_at FROM orders WHERE restaurant_id = $rid AND table_id = $tid \
                 ORDER BY created_at DESC LIMIT 1",
            )
            .bind(("rid", restaurant_id.to_string()))
            .bind(("tid", table_id.to_string()))
            .await?;
        #[derive(serde::Deserialize)]
        struct Row {
            created_at: i64,
        }
        let rows: Vec<Row> = result.take(0)?;
        Ok(rows.into_iter().next().map(|r| r.created_at))
    }

    // =========================================================================
    // Status transitions
    // =========================================================================

    /// Update an order's status (and payment method when settling)
    pub async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        payment_method: Option<PaymentMethod>,
        updated_at: i64,
    ) -> RepoResult<Order> {
        let thing = parse_record_id(order_id, "order")?;
        match payment_method {
            Some(method) => {
                self.base
                    .db()
                    .query(
                        "UPDATE $thing SET status = $status, payment_method = $method, \
                         updated_at = $at",
                    )
                    .bind(("thing", thing))
                    .bind(("status", status.as_str()))
                    .bind(("method", method))
                    .bind(("at", updated_at))
                    .await?;
            }
            None => {
                self.base
                    .db()
                    .query("UPDATE $thing SET status = $status, updated_at = $at")
                    .bind(("thing", thing))
                    .bind(("status", status.as_str()))
                    .bind(("at", updated_at))
                    .await?;
            }
        }
        self.find_by_id(order_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", order_id)))
    }

    /// Mirror a status onto every line item of an order
    pub async fn sync_items_status(&self, order_id: &str, status: OrderStatus) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE order_items SET status = $status WHERE order_id = $oid")
            .bind(("status", status.as_str()))
            .bind(("oid", order_id.to_string()))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Staff edits
    // =========================================================================

    /// Update order-level fields after an edit (total, notes)
    pub async fn update_totals(
        &self,
        order_id: &str,
        total_amount: f64,
        notes: Option<String>,
        updated_at: i64,
    ) -> RepoResult<()> {
        let thing = parse_record_id(order_id, "order")?;
        self.base
            .db()
            .query("UPDATE $thing SET total_amount = $total, notes = $notes, updated_at = $at")
            .bind(("thing", thing))
            .bind(("total", total_amount))
            .bind(("notes", notes))
            .bind(("at", updated_at))
            .await?;
        Ok(())
    }

    /// Delete removed line-item rows by id
    pub async fn delete_items(&self, item_ids: &[String]) -> RepoResult<()> {
        if item_ids.is_empty() {
            return Ok(());
        }
        let things = item_ids
            .iter()
            .map(|id| parse_record_id(id, "order item"))
            .collect::<RepoResult<Vec<_>>>()?;
        self.base
            .db()
            .query("DELETE FROM order_items WHERE id IN $ids")
            .bind(("ids", things))
            .await?;
        Ok(())
    }

    /// Update one surviving line after an edit
    pub async fn update_item(
        &self,
        item_id: &RecordId,
        quantity: i32,
        unit_price: f64,
        total_price: f64,
        notes: Option<String>,
        status: OrderStatus,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query(
                "UPDATE $thing SET quantity = $quantity, unit_price = $unit_price, \
                 total_price = $total_price, notes = $notes, status = $status",
            )
            .bind(("thing", item_id.clone()))
            .bind(("quantity", quantity))
            .bind(("unit_price", unit_price))
            .bind(("total_price", total_price))
            .bind(("notes", notes))
            .bind(("status", status.as_str()))
            .await?;
        Ok(())
    }

    /// Insert one line added during an edit
    pub async fn insert_item(&self, item: OrderItem) -> RepoResult<OrderItem> {
        let created: Option<OrderItem> = self.base.db().create(ITEMS_TABLE).content(item).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order item".to_string()))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Fetch items and table names for a list of orders
    async fn attach_items(&self, orders: Vec<Order>) -> RepoResult<Vec<OrderDetail>> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<String> = orders
            .iter()
            .filter_map(|o| o.id.as_ref().map(|id| id.to_string()))
            .collect();
        let items: Vec<OrderItem> = self
            .base
            .db()
            .query("SELECT * FROM order_items WHERE order_id IN $ids ORDER BY created_at")
            .bind(("ids", order_ids))
            .await?
            .take(0)?;

        let mut items_by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
        for item in items {
            items_by_order
                .entry(item.order_id.to_string())
                .or_default()
                .push(item);
        }

        // Resolve table names in one query
        let table_ids: Vec<RecordId> = {
            let mut seen = Vec::new();
            for order in &orders {
                if !seen.contains(&order.table_id) {
                    seen.push(order.table_id.clone());
                }
            }
            seen
        };
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query("SELECT * FROM tables WHERE id IN $ids")
            .bind(("ids", table_ids))
            .await?
            .take(0)?;
        let names: HashMap<String, String> = tables
            .into_iter()
            .filter_map(|t| t.id.as_ref().map(|id| (id.to_string(), t.name.clone())))
            .collect();

        Ok(orders
            .into_iter()
            .map(|order| {
                let key = order.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
                let table_name = names.get(&order.table_id.to_string()).cloned();
                OrderDetail {
                    items: items_by_order.remove(&key).unwrap_or_default(),
                    table_name,
                    order,
                }
            })
            .collect())
    }
}
