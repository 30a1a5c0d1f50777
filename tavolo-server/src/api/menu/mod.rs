//! 顾客菜单 API 模块
//!
//! 令牌校验先于任何其他数据读取：无令牌/坏令牌直接返回 401，
//! 不会泄露任何菜单数据。

mod handler;

pub use handler::{MenuPayload, TokenQuery};

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/api/menu/{restaurant_id}/{table_id}",
        get(handler::menu),
    )
}
