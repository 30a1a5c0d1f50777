//! 会话 Handler

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::TableSession;
use shared::client::PartySizeRequest;

use crate::api::convert::record_ref;
use crate::api::menu::TokenQuery;
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/session/:restaurant_id/:table_id?token= - 校验会话
///
/// Returns the validated session (with any stored party size). Failure
/// reasons map to reason-specific messages; the customer page shows them on
/// the invalid-QR screen with a retry action.
pub async fn validate(
    State(state): State<ServerState>,
    Path((restaurant_id, table_id)): Path<(String, String)>,
    Query(query): Query<TokenQuery>,
) -> AppResult<Json<TableSession>> {
    let session = state
        .gate
        .validate_entry(
            &record_ref("restaurants", &restaurant_id),
            &record_ref("tables", &table_id),
            query.token.as_deref(),
        )
        .await?;
    Ok(Json(session))
}

/// POST /api/session/:restaurant_id/:table_id/party-size?token= - 设置就餐人数
pub async fn set_party_size(
    State(state): State<ServerState>,
    Path((restaurant_id, table_id)): Path<(String, String)>,
    Query(query): Query<TokenQuery>,
    Json(req): Json<PartySizeRequest>,
) -> AppResult<Json<TableSession>> {
    let restaurant_ref = record_ref("restaurants", &restaurant_id);
    let table_ref = record_ref("tables", &table_id);

    let session = state
        .gate
        .validate_entry(&restaurant_ref, &table_ref, query.token.as_deref())
        .await?;
    state.gate.set_party_size(&session, req.party_size).await?;

    // Re-read so the response reflects the stored value
    let session = state
        .gate
        .validate_entry(&restaurant_ref, &table_ref, query.token.as_deref())
        .await?;
    Ok(Json(session))
}
