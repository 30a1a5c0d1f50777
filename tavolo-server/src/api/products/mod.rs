//! 菜单管理 API 模块

mod handler;

use axum::{Router, middleware, routing::{get, put}};

use crate::auth::require_auth;
use crate::core::ServerState;

pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/products", get(handler::list).post(handler::create))
        .route("/api/products/{id}", put(handler::update))
        .route("/api/categories", get(handler::list_categories))
        .layer(middleware::from_fn_with_state(state, require_auth))
}
