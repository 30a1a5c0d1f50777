//! Order workflow — status transitions and their side effects
//!
//! `pending → preparing → ready → served → paid`, forward-only. Every
//! transition mirrors the new status onto the order's line items and is
//! announced on the change feed; settling the whole table additionally
//! revokes its session tokens.
//!
//! Capability is enforced here by role, not by hiding buttons: the kitchen
//! may only start preparation and mark orders ready; delivery and payment
//! belong to the floor.
//!
//! Each transition is two sequential writes (order row, then item fan-out)
//! with no surrounding transaction. A failure between them leaves items one
//! step behind; the next transition or refetch reconciles them.

use crate::auth::CurrentStaff;
use crate::db::repository::OrderRepository;
use crate::db::models::Order;
use crate::realtime::{ChangeFeed, resources};
use crate::session::TokenService;
use crate::utils::{AppError, AppResult, now_millis};
use shared::{ChangeAction, OrderStatus, PaymentMethod, StaffRole};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Order state machine
#[derive(Clone)]
pub struct OrderWorkflow {
    orders: OrderRepository,
    tokens: TokenService,
    feed: ChangeFeed,
}

/// Whether a role may trigger `from → to`
///
/// Kitchen is limited to the two kitchen steps; everyone else may trigger
/// any legal transition.
pub fn role_may_advance(role: StaffRole, from: OrderStatus, to: OrderStatus) -> bool {
    match role {
        StaffRole::Kitchen => matches!(
            (from, to),
            (OrderStatus::Pending, OrderStatus::Preparing)
                | (OrderStatus::Preparing, OrderStatus::Ready)
        ),
        StaffRole::Admin | StaffRole::Manager | StaffRole::Floor => true,
    }
}

/// Whether a role may settle bills
pub fn role_may_settle(role: StaffRole) -> bool {
    !matches!(role, StaffRole::Kitchen)
}

impl OrderWorkflow {
    pub fn new(db: Surreal<Db>, tokens: TokenService, feed: ChangeFeed) -> Self {
        Self {
            orders: OrderRepository::new(db),
            tokens,
            feed,
        }
    }

    /// Advance an order one step along the kitchen/floor chain
    ///
    /// Payment goes through [`pay`](Self::pay), which records the payment
    /// method; `paid` is rejected here.
    pub async fn advance(
        &self,
        staff: &CurrentStaff,
        order_id: &str,
        target: OrderStatus,
    ) -> AppResult<Order> {
        if target == OrderStatus::Paid {
            return Err(AppError::business_rule(
                "Paying an order requires a payment method; use the payment operation.",
            ));
        }

        let order = self.load_scoped(staff, order_id).await?;
        let from = order.status;
        if !from.allows(target) {
            return Err(AppError::business_rule(format!(
                "An order cannot move from {} to {}.",
                from, target
            )));
        }
        if !role_may_advance(staff.role, from, target) {
            return Err(AppError::forbidden(format!(
                "Kitchen staff cannot mark orders as {}.",
                target
            )));
        }

        self.commit_status(&order, target, None).await
    }

    /// Settle one order with a payment method
    pub async fn pay(
        &self,
        staff: &CurrentStaff,
        order_id: &str,
        method: PaymentMethod,
    ) -> AppResult<Order> {
        if !role_may_settle(staff.role) {
            return Err(AppError::forbidden(
                "Kitchen staff cannot settle bills.".to_string(),
            ));
        }

        let order = self.load_scoped(staff, order_id).await?;
        if !order.status.allows(OrderStatus::Paid) {
            return Err(AppError::business_rule("Order is already paid."));
        }

        self.commit_status(&order, OrderStatus::Paid, Some(method)).await
    }

    /// Settle every open order of a table and end its customer session
    ///
    /// Returns the settled orders; an empty vector means the table was
    /// already free. The token revocation runs after the order writes, so
    /// the previously-valid customer token fails validation with `Revoked`
    /// from then on.
    pub async fn close_table(
        &self,
        staff: &CurrentStaff,
        table_id: &str,
        method: PaymentMethod,
    ) -> AppResult<Vec<Order>> {
        if !role_may_settle(staff.role) {
            return Err(AppError::forbidden(
                "Kitchen staff cannot settle bills.".to_string(),
            ));
        }
        let restaurant_id = staff.restaurant_id()?.to_string();

        let open = self
            .orders
            .find_open_for_table(&restaurant_id, table_id)
            .await?;

        let mut settled = Vec::with_capacity(open.len());
        for order in &open {
            settled.push(self.commit_status(order, OrderStatus::Paid, Some(method)).await?);
        }

        self.tokens
            .revoke_all_for_table(&restaurant_id, table_id)
            .await?;

        tracing::info!(
            table = %table_id,
            orders = settled.len(),
            "Table closed and session revoked"
        );
        Ok(settled)
    }

    /// Persist a transition: order row, then item fan-out, then the feed
    async fn commit_status(
        &self,
        order: &Order,
        target: OrderStatus,
        method: Option<PaymentMethod>,
    ) -> AppResult<Order> {
        let order_id = order
            .id
            .as_ref()
            .map(|id| id.to_string())
            .ok_or_else(|| AppError::internal("Order has no id"))?;
        let restaurant_id = order.restaurant_id.to_string();

        let updated = self
            .orders
            .update_status(&order_id, target, method, now_millis())
            .await?;
        // Item fan-out is a second write; see module docs for the
        // partial-application caveat
        self.orders.sync_items_status(&order_id, target).await?;

        self.feed.notify(
            resources::ORDERS,
            ChangeAction::Update,
            &restaurant_id,
            Some(order_id.clone()),
        );
        self.feed.notify(
            resources::ORDER_ITEMS,
            ChangeAction::Update,
            &restaurant_id,
            Some(order_id),
        );
        Ok(updated)
    }

    /// Load an order and check it belongs to the acting staff's restaurant
    async fn load_scoped(&self, staff: &CurrentStaff, order_id: &str) -> AppResult<Order> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;
        staff.ensure_same_restaurant(&order.restaurant_id.to_string())?;
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{DiningTableCreate, OrderItem, RestaurantCreate};
    use crate::db::repository::{
        DiningTableRepository, RestaurantRepository,
    };
    use shared::TokenRejection;
    use surrealdb::RecordId;

    struct Fixture {
        workflow: OrderWorkflow,
        orders: OrderRepository,
        tokens: TokenService,
        rid: String,
        tid: String,
    }

    async fn setup() -> Fixture {
        let db = DbService::open_memory().await.unwrap();
        let feed = ChangeFeed::new();
        let restaurant = RestaurantRepository::new(db.db.clone())
            .create(RestaurantCreate {
                name: "Da Mario".to_string(),
                address: None,
                phone: None,
            })
            .await
            .unwrap();
        let rid = restaurant.id.unwrap().to_string();
        let table = DiningTableRepository::new(db.db.clone())
            .create(&rid, DiningTableCreate {
                name: "T1".to_string(),
            })
            .await
            .unwrap();
        let tid = table.id.unwrap().to_string();

        let tokens = TokenService::new(db.db.clone(), feed.clone());
        Fixture {
            workflow: OrderWorkflow::new(db.db.clone(), tokens.clone(), feed),
            orders: OrderRepository::new(db.db),
            tokens,
            rid,
            tid,
        }
    }

    fn staff(role: StaffRole, rid: &str) -> CurrentStaff {
        CurrentStaff {
            id: "employees:test".to_string(),
            username: "test".to_string(),
            role,
            restaurant_id: Some(rid.to_string()),
        }
    }

    async fn seed_order(f: &Fixture) -> String {
        let now = now_millis();
        let order = Order {
            id: None,
            restaurant_id: f.rid.parse().unwrap(),
            table_id: f.tid.parse().unwrap(),
            status: OrderStatus::Pending,
            total_amount: 21.5,
            notes: None,
            party_size: Some(2),
            payment_method: None,
            created_at: now,
            updated_at: now,
        };
        let items = vec![OrderItem {
            id: None,
            order_id: RecordId::from_table_key("orders", "pending"),
            product_id: RecordId::from_table_key("products", "p1"),
            quantity: 2,
            unit_price: 8.0,
            total_price: 16.0,
            notes: None,
            variant_id: None,
            status: OrderStatus::Pending,
            created_at: now,
        }];
        let detail = f.orders.create_with_items(order, items).await.unwrap();
        detail.order.id.unwrap().to_string()
    }

    #[tokio::test]
    async fn transitions_walk_the_chain_and_fan_out_to_items() {
        let f = setup().await;
        let order_id = seed_order(&f).await;
        let floor = staff(StaffRole::Floor, &f.rid);

        for target in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::Served] {
            let order = f.workflow.advance(&floor, &order_id, target).await.unwrap();
            assert_eq!(order.status, target);
            let items = f.orders.find_items(&order_id).await.unwrap();
            assert!(items.iter().all(|i| i.status == target));
        }
    }

    #[tokio::test]
    async fn skipping_and_backward_steps_are_rejected() {
        let f = setup().await;
        let order_id = seed_order(&f).await;
        let floor = staff(StaffRole::Floor, &f.rid);

        // pending → ready skips a step
        let err = f
            .workflow
            .advance(&floor, &order_id, OrderStatus::Ready)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));

        f.workflow
            .advance(&floor, &order_id, OrderStatus::Preparing)
            .await
            .unwrap();
        // preparing → pending walks backwards
        let err = f
            .workflow
            .advance(&floor, &order_id, OrderStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn paid_is_terminal() {
        let f = setup().await;
        let order_id = seed_order(&f).await;
        let floor = staff(StaffRole::Floor, &f.rid);

        let order = f
            .workflow
            .pay(&floor, &order_id, PaymentMethod::Card)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.payment_method, Some(PaymentMethod::Card));

        let err = f
            .workflow
            .pay(&floor, &order_id, PaymentMethod::Cash)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
        let err = f
            .workflow
            .advance(&floor, &order_id, OrderStatus::Preparing)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn kitchen_role_is_limited_to_kitchen_steps() {
        let f = setup().await;
        let order_id = seed_order(&f).await;
        let kitchen = staff(StaffRole::Kitchen, &f.rid);

        f.workflow
            .advance(&kitchen, &order_id, OrderStatus::Preparing)
            .await
            .unwrap();
        f.workflow
            .advance(&kitchen, &order_id, OrderStatus::Ready)
            .await
            .unwrap();

        // Delivery and payment belong to the floor
        let err = f
            .workflow
            .advance(&kitchen, &order_id, OrderStatus::Served)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = f
            .workflow
            .pay(&kitchen, &order_id, PaymentMethod::Cash)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn staff_of_another_restaurant_is_rejected() {
        let f = setup().await;
        let order_id = seed_order(&f).await;
        let other = staff(StaffRole::Floor, "restaurants:someone_else");

        let err = f
            .workflow
            .advance(&other, &order_id, OrderStatus::Preparing)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn closing_a_table_settles_orders_and_revokes_tokens() {
        let f = setup().await;
        let first = seed_order(&f).await;
        let second = seed_order(&f).await;
        let floor = staff(StaffRole::Floor, &f.rid);

        let issued = f.tokens.issue(&f.rid, &f.tid, "http://localhost").await.unwrap();
        assert!(f.tokens.validate(&issued.token, &f.rid, &f.tid).await.is_ok());

        let settled = f
            .workflow
            .close_table(&floor, &f.tid, PaymentMethod::Cash)
            .await
            .unwrap();
        assert_eq!(settled.len(), 2);
        assert!(settled.iter().all(|o| o.status == OrderStatus::Paid
            && o.payment_method == Some(PaymentMethod::Cash)));

        for order_id in [&first, &second] {
            let items = f.orders.find_items(order_id).await.unwrap();
            assert!(items.iter().all(|i| i.status == OrderStatus::Paid));
        }

        // The customer session died with the bill
        let err = f
            .tokens
            .validate(&issued.token, &f.rid, &f.tid)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::TokenInvalid(TokenRejection::Revoked)
        ));

        // Closing again is a no-op on an already-free table
        let settled = f
            .workflow
            .close_table(&floor, &f.tid, PaymentMethod::Cash)
            .await
            .unwrap();
        assert!(settled.is_empty());
    }
}
