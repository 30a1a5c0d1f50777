//! 呼叫服务员 API 模块

mod handler;

use axum::{Router, middleware, routing::{get, post}};

use crate::auth::require_auth;
use crate::core::ServerState;

/// Customer-facing route (table-token gated inside the handler)
///
/// Lives under the session prefix, like customer ordering.
pub fn customer_router() -> Router<ServerState> {
    Router::new().route(
        "/api/session/{restaurant_id}/{table_id}/waiter-calls",
        post(handler::call),
    )
}

/// Staff-facing routes (JWT gated)
pub fn staff_router(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/waiter-calls", get(handler::list_active))
        .route("/api/waiter-calls/{id}/resolve", post(handler::resolve))
        .layer(middleware::from_fn_with_state(state, require_auth))
}
