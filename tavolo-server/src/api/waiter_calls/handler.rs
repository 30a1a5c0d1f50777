//! 呼叫服务员 Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

use shared::ChangeAction;

use crate::api::convert::record_ref;
use crate::api::menu::TokenQuery;
use crate::auth::CurrentStaff;
use crate::core::ServerState;
use crate::db::models::WaiterCall;
use crate::db::repository::WaiterCallRepository;
use crate::realtime::resources;
use crate::utils::{AppError, AppResult};

/// POST /api/session/:restaurant_id/:table_id/waiter-calls?token= - 顾客呼叫
pub async fn call(
    State(state): State<ServerState>,
    Path((restaurant_id, table_id)): Path<(String, String)>,
    Query(query): Query<TokenQuery>,
) -> AppResult<Json<WaiterCall>> {
    let restaurant_ref = record_ref("restaurants", &restaurant_id);
    let table_ref = record_ref("tables", &table_id);

    state
        .gate
        .validate_entry(&restaurant_ref, &table_ref, query.token.as_deref())
        .await?;

    let repo = WaiterCallRepository::new(state.db.clone());
    let created = repo.create(&restaurant_ref, &table_ref).await?;

    state.feed.notify(
        resources::WAITER_CALLS,
        ChangeAction::Insert,
        &restaurant_ref,
        created.id.as_ref().map(|id| id.to_string()),
    );
    tracing::info!(table = %table_ref, "Waiter called");

    Ok(Json(created))
}

/// GET /api/waiter-calls - 当前餐厅的未处理呼叫
pub async fn list_active(
    State(state): State<ServerState>,
    Extension(staff): Extension<CurrentStaff>,
) -> AppResult<Json<Vec<WaiterCall>>> {
    let restaurant_id = staff.restaurant_id()?;
    let repo = WaiterCallRepository::new(state.db.clone());
    let calls = repo.find_active(restaurant_id).await?;
    Ok(Json(calls))
}

/// POST /api/waiter-calls/:id/resolve - 标记已处理
pub async fn resolve(
    State(state): State<ServerState>,
    Extension(staff): Extension<CurrentStaff>,
    Path(id): Path<String>,
) -> AppResult<Json<WaiterCall>> {
    let call_ref = record_ref("waiter_calls", &id);
    let repo = WaiterCallRepository::new(state.db.clone());
    let call = repo
        .find_by_id(&call_ref)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Waiter call {} not found", call_ref)))?;
    staff.ensure_same_restaurant(&call.restaurant_id.to_string())?;

    let resolved = repo.resolve(&call_ref).await?;

    state.feed.notify(
        resources::WAITER_CALLS,
        ChangeAction::Update,
        &resolved.restaurant_id.to_string(),
        resolved.id.as_ref().map(|id| id.to_string()),
    );

    Ok(Json(resolved))
}
