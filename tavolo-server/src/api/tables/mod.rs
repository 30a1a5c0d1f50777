//! 桌台管理 API 模块
//!
//! 管理操作限 manager/admin；关台结账属于楼面操作。

mod handler;

use axum::{Router, middleware, routing::{get, post, put}};

use crate::auth::require_auth;
use crate::core::ServerState;

pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/tables", get(handler::list).post(handler::create))
        .route("/api/tables/{id}", put(handler::update))
        .route("/api/tables/{id}/close", post(handler::close))
        .layer(middleware::from_fn_with_state(state, require_auth))
}
