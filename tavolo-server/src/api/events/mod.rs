//! SSE 变更推送 API 模块
//!
//! 员工终端订阅本餐厅的变更事件，收到后重新拉取受影响的视图
//! （refetch-on-event）。事件只是"有变化"的信号，不承诺有序与恰好一次。

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_auth;
use crate::core::ServerState;

pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/events", get(handler::subscribe))
        .layer(middleware::from_fn_with_state(state, require_auth))
}
