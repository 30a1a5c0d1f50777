//! QR 发码 API 模块
//!
//! 扫码入口：匿名访问，开放 CORS（GET/OPTIONS）。

mod handler;

use axum::{Router, routing::get};
use http::Method;
use tower_http::cors::{Any, CorsLayer};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    // The QR endpoint is reached by an anonymous scan from any origin; the
    // JSON variant must pass browser CORS checks
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/qr/{restaurant_id}/{table_id}", get(handler::issue))
        .layer(cors)
}
