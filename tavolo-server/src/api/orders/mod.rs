//! 订单 API 模块
//!
//! 顾客下单走桌台令牌门禁；员工操作走 JWT 门禁（在 server 装配时套
//! `require_auth` 中间件）。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_auth;
use crate::core::ServerState;

/// Customer-facing routes (table-token gated inside the handlers)
///
/// Customer operations live under the session prefix so the staff order
/// routes keep `/api/orders/{id}/...` to themselves.
pub fn customer_router() -> Router<ServerState> {
    Router::new().route(
        "/api/session/{restaurant_id}/{table_id}/orders",
        post(handler::place_order),
    )
}

/// Staff-facing routes (JWT gated)
pub fn staff_router(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/orders", get(handler::list))
        .route("/api/orders/{id}", put(handler::edit))
        .route("/api/orders/{id}/status", post(handler::update_status))
        .route("/api/orders/{id}/pay", post(handler::pay))
        .layer(middleware::from_fn_with_state(state, require_auth))
}
