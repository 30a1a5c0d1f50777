//! 会话 API 模块
//!
//! 顾客会话的显式校验与就餐人数设置。

mod handler;

use axum::{Router, routing::{get, post}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/session/{restaurant_id}/{table_id}",
            get(handler::validate),
        )
        .route(
            "/api/session/{restaurant_id}/{table_id}/party-size",
            post(handler::set_party_size),
        )
}
