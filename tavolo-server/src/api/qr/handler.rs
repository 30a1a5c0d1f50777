//! QR 发码 Handler
//!
//! GET /qr/:restaurant_id/:table_id — 扫码即发放新令牌并跳转顾客菜单。
//!
//! 浏览器直接访问 → 302 跳转；`Accept: application/json` 或
//! `X-Requested-With: XMLHttpRequest` 的 fetch 调用 → JSON 响应。

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use shared::client::QrIssueResponse;

use crate::api::convert::record_ref;
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /qr/:restaurant_id/:table_id - 发放桌台令牌
pub async fn issue(
    State(state): State<ServerState>,
    Path((restaurant_id, table_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let restaurant_ref = record_ref("restaurants", &restaurant_id);
    let table_ref = record_ref("tables", &table_id);

    let issued = state
        .tokens
        .issue(&restaurant_ref, &table_ref, &state.config.public_base_url)
        .await?;

    if wants_json(&headers) {
        return Ok(Json(QrIssueResponse {
            redirect_url: issued.redirect_url,
            token: issued.token,
        })
        .into_response());
    }

    // Direct browser navigation: temporary redirect into the customer menu
    Ok(Redirect::temporary(&issued.redirect_url).into_response())
}

/// Accept-header heuristic: fetch callers get JSON, browsers get a 302
fn wants_json(headers: &HeaderMap) -> bool {
    let accepts_json = headers
        .get(http::header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"));
    let requested_with = headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "XMLHttpRequest");
    accepts_json || requested_with
}
