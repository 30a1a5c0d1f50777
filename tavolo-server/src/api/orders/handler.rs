//! 订单 Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use std::collections::HashMap;

use shared::client::{OrderEditRequest, PayRequest, PlaceOrderRequest, StatusUpdateRequest};
use shared::{ChangeAction, OrderStatus, StaffRole};

use crate::api::convert::record_ref;
use crate::api::menu::TokenQuery;
use crate::auth::CurrentStaff;
use crate::core::ServerState;
use crate::db::models::{OrderDetail, Product};
use crate::db::repository::{OrderRepository, ProductRepository, RestaurantRepository};
use crate::orders::{OrderCart, PricingMode, apply_edit};
use crate::realtime::resources;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult, now_millis};

// =============================================================================
// Customer
// =============================================================================

/// POST /api/session/:restaurant_id/:table_id/orders?token= - 顾客下单
///
/// Validation order: session token, order cooldown, party size, cart rules.
/// Nothing is written unless all of them pass. Prices come from the product
/// catalog only.
pub async fn place_order(
    State(state): State<ServerState>,
    Path((restaurant_id, table_id)): Path<(String, String)>,
    Query(query): Query<TokenQuery>,
    Json(req): Json<PlaceOrderRequest>,
) -> AppResult<Json<OrderDetail>> {
    let restaurant_ref = record_ref("restaurants", &restaurant_id);
    let table_ref = record_ref("tables", &table_id);

    let session = state
        .gate
        .validate_entry(&restaurant_ref, &table_ref, query.token.as_deref())
        .await?;

    let restaurant = RestaurantRepository::new(state.db.clone())
        .find_by_id(&restaurant_ref)
        .await?
        .filter(|r| r.is_active)
        .ok_or_else(|| AppError::not_found("Restaurant not found".to_string()))?;

    state
        .gate
        .check_order_cooldown(&restaurant, &restaurant_ref, &table_ref)
        .await?;

    // Party size gate: reactive enforcement at submit time
    let party_size = state.gate.ensure_party_size(&session, req.party_size).await?;

    validate_optional_text(&req.notes, "order note", MAX_NOTE_LEN)?;

    let catalog = load_catalog(
        &state,
        &restaurant_ref,
        req.items.iter().map(|i| i.product_id.clone()),
    )
    .await?;

    let mode = PricingMode::for_restaurant(&restaurant);
    let cart = OrderCart::from_submission(mode, &req.items, &catalog)?;
    let (order, items) = cart.into_rows(
        restaurant_ref
            .parse()
            .map_err(|_| AppError::validation("Invalid restaurant ID"))?,
        table_ref
            .parse()
            .map_err(|_| AppError::validation("Invalid table ID"))?,
        party_size,
        req.notes.clone(),
    );

    let repo = OrderRepository::new(state.db.clone());
    let detail = repo.create_with_items(order, items).await?;

    let order_id = detail.order.id.as_ref().map(|id| id.to_string());
    state.feed.notify(
        resources::ORDERS,
        ChangeAction::Insert,
        &restaurant_ref,
        order_id.clone(),
    );
    state.feed.notify(
        resources::ORDER_ITEMS,
        ChangeAction::Insert,
        &restaurant_ref,
        order_id,
    );
    tracing::info!(table = %table_ref, total = detail.order.total_amount, "Order placed");

    Ok(Json(detail))
}

// =============================================================================
// Staff
// =============================================================================

/// GET /api/orders - 当前餐厅的活动订单（含行与桌名）
pub async fn list(
    State(state): State<ServerState>,
    Extension(staff): Extension<CurrentStaff>,
) -> AppResult<Json<Vec<OrderDetail>>> {
    let restaurant_id = staff.restaurant_id()?;
    let repo = OrderRepository::new(state.db.clone());
    let orders = repo
        .find_for_restaurant(restaurant_id, &OrderStatus::OPEN)
        .await?;
    Ok(Json(orders))
}

/// POST /api/orders/:id/status - 推进订单状态
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(staff): Extension<CurrentStaff>,
    Path(id): Path<String>,
    Json(req): Json<StatusUpdateRequest>,
) -> AppResult<Json<OrderDetail>> {
    let order_ref = record_ref("orders", &id);
    state.workflow.advance(&staff, &order_ref, req.status).await?;
    refetch_detail(&state, &order_ref).await
}

/// POST /api/orders/:id/pay - 结账（记录支付方式）
pub async fn pay(
    State(state): State<ServerState>,
    Extension(staff): Extension<CurrentStaff>,
    Path(id): Path<String>,
    Json(req): Json<PayRequest>,
) -> AppResult<Json<OrderDetail>> {
    let order_ref = record_ref("orders", &id);
    state
        .workflow
        .pay(&staff, &order_ref, req.payment_method)
        .await?;
    refetch_detail(&state, &order_ref).await
}

/// PUT /api/orders/:id - 员工改单
///
/// Removed persisted lines are deleted (not zeroed); the total is recomputed
/// from the surviving set under the order's pricing mode; touched and new
/// lines keep the order's current workflow status.
pub async fn edit(
    State(state): State<ServerState>,
    Extension(staff): Extension<CurrentStaff>,
    Path(id): Path<String>,
    Json(req): Json<OrderEditRequest>,
) -> AppResult<Json<OrderDetail>> {
    if staff.role == StaffRole::Kitchen {
        return Err(AppError::forbidden(
            "Kitchen staff cannot edit orders".to_string(),
        ));
    }

    let order_ref = record_ref("orders", &id);
    let repo = OrderRepository::new(state.db.clone());
    let order = repo
        .find_by_id(&order_ref)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_ref)))?;
    let restaurant_ref = order.restaurant_id.to_string();
    staff.ensure_same_restaurant(&restaurant_ref)?;
    if order.status.is_terminal() {
        return Err(AppError::business_rule("A paid order cannot be edited."));
    }

    let restaurant = RestaurantRepository::new(state.db.clone())
        .find_by_id(&restaurant_ref)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant not found".to_string()))?;
    let mode = PricingMode::for_restaurant(&restaurant);

    let existing_items = repo.find_items(&order_ref).await?;
    let catalog = load_catalog(
        &state,
        &restaurant_ref,
        req.items.iter().map(|i| i.product_id.clone()),
    )
    .await?;

    let applied = apply_edit(&order, &existing_items, req, &catalog, mode)?;

    // Sequential writes: order fields, removals, updates, inserts. No
    // rollback on a mid-sequence failure; the refetch below is the recovery
    // mechanism for readers.
    repo.update_totals(
        &order_ref,
        applied.total_amount,
        applied.notes.clone(),
        now_millis(),
    )
    .await?;
    repo.delete_items(&applied.removed_item_ids).await?;
    for update in &applied.updates {
        repo.update_item(
            &update.item_id,
            update.quantity,
            update.unit_price,
            update.total_price,
            update.notes.clone(),
            order.status,
        )
        .await?;
    }
    for item in applied.inserts {
        repo.insert_item(item).await?;
    }

    state.feed.notify(
        resources::ORDERS,
        ChangeAction::Update,
        &restaurant_ref,
        Some(order_ref.clone()),
    );
    state.feed.notify(
        resources::ORDER_ITEMS,
        ChangeAction::Update,
        &restaurant_ref,
        Some(order_ref.clone()),
    );

    refetch_detail(&state, &order_ref).await
}

// =============================================================================
// Helpers
// =============================================================================

/// Load the referenced products and check they belong to the restaurant
async fn load_catalog(
    state: &ServerState,
    restaurant_ref: &str,
    product_ids: impl Iterator<Item = String>,
) -> AppResult<HashMap<String, Product>> {
    let mut ids: Vec<String> = product_ids.collect();
    ids.sort();
    ids.dedup();

    let products = ProductRepository::new(state.db.clone())
        .find_by_ids(&ids)
        .await?;
    let catalog: HashMap<String, Product> = products
        .into_iter()
        .filter(|p| p.restaurant_id.to_string() == restaurant_ref)
        .filter_map(|p| p.id.as_ref().map(|id| (id.to_string(), p.clone())))
        .collect();
    Ok(catalog)
}

/// Post-transition refetch: the authoritative consistency mechanism
async fn refetch_detail(state: &ServerState, order_ref: &str) -> AppResult<Json<OrderDetail>> {
    let repo = OrderRepository::new(state.db.clone());
    let detail = repo
        .find_detail(order_ref)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_ref)))?;
    Ok(Json(detail))
}
