//! 厨房工作台 API 模块
//!
//! 只暴露 pending/preparing 两列；出餐之后的状态属于楼面。
//! 角色能力在工作流里强制（厨房账号即使直接调用 /api/orders 的
//! 状态接口也推不动 served/paid）。

mod handler;

use axum::{Router, middleware, routing::{get, post}};

use crate::auth::require_auth;
use crate::core::ServerState;

pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/kitchen/orders", get(handler::list))
        .route("/api/kitchen/orders/{id}/status", post(handler::advance))
        .layer(middleware::from_fn_with_state(state, require_auth))
}
