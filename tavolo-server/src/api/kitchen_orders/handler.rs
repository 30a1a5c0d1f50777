//! 厨房工作台 Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use shared::OrderStatus;
use shared::client::StatusUpdateRequest;

use crate::api::convert::record_ref;
use crate::auth::CurrentStaff;
use crate::core::ServerState;
use crate::db::models::OrderDetail;
use crate::db::repository::OrderRepository;
use crate::utils::{AppError, AppResult};

/// The two kitchen columns
const KITCHEN_STATUSES: [OrderStatus; 2] = [OrderStatus::Pending, OrderStatus::Preparing];

/// GET /api/kitchen/orders - 待开始 / 制作中 的订单
pub async fn list(
    State(state): State<ServerState>,
    Extension(staff): Extension<CurrentStaff>,
) -> AppResult<Json<Vec<OrderDetail>>> {
    let restaurant_id = staff.restaurant_id()?;
    let repo = OrderRepository::new(state.db.clone());
    let mut orders = repo
        .find_for_restaurant(restaurant_id, &KITCHEN_STATUSES)
        .await?;
    // Kitchen works oldest-first
    orders.sort_by_key(|detail| detail.order.created_at);
    Ok(Json(orders))
}

/// POST /api/kitchen/orders/:id/status - 开始制作 / 出餐
pub async fn advance(
    State(state): State<ServerState>,
    Extension(staff): Extension<CurrentStaff>,
    Path(id): Path<String>,
    Json(req): Json<StatusUpdateRequest>,
) -> AppResult<Json<OrderDetail>> {
    // The kitchen surface only offers the two kitchen steps; anything else
    // is rejected here even for privileged roles using this endpoint
    if !matches!(req.status, OrderStatus::Preparing | OrderStatus::Ready) {
        return Err(AppError::business_rule(
            "The kitchen view only starts preparation or marks orders ready.",
        ));
    }

    let order_ref = record_ref("orders", &id);
    state.workflow.advance(&staff, &order_ref, req.status).await?;

    let repo = OrderRepository::new(state.db.clone());
    let detail = repo
        .find_detail(&order_ref)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_ref)))?;
    Ok(Json(detail))
}
