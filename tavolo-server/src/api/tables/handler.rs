//! 桌台管理 Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use shared::ChangeAction;
use shared::client::CloseTableRequest;

use crate::api::convert::record_ref;
use crate::auth::CurrentStaff;
use crate::core::ServerState;
use crate::db::models::{DiningTable, DiningTableCreate, DiningTableUpdate, Order};
use crate::db::repository::DiningTableRepository;
use crate::realtime::resources;
use crate::utils::validation::validate_name;
use crate::utils::{AppError, AppResult};

/// GET /api/tables - 当前餐厅的桌台
pub async fn list(
    State(state): State<ServerState>,
    Extension(staff): Extension<CurrentStaff>,
) -> AppResult<Json<Vec<DiningTable>>> {
    let restaurant_id = staff.restaurant_id()?;
    let repo = DiningTableRepository::new(state.db.clone());
    let tables = repo.find_for_restaurant(restaurant_id).await?;
    Ok(Json(tables))
}

/// POST /api/tables - 新建桌台
pub async fn create(
    State(state): State<ServerState>,
    Extension(staff): Extension<CurrentStaff>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<DiningTable>> {
    require_manage(&staff)?;
    validate_name(&payload.name, "table name")?;
    let restaurant_id = staff.restaurant_id()?.to_string();

    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo.create(&restaurant_id, payload).await?;

    state.feed.notify(
        resources::TABLES,
        ChangeAction::Insert,
        &restaurant_id,
        table.id.as_ref().map(|id| id.to_string()),
    );

    Ok(Json(table))
}

/// PUT /api/tables/:id - 更新桌台（改名 / 停用）
pub async fn update(
    State(state): State<ServerState>,
    Extension(staff): Extension<CurrentStaff>,
    Path(id): Path<String>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    require_manage(&staff)?;
    if let Some(name) = &payload.name {
        validate_name(name, "table name")?;
    }

    let table_ref = record_ref("tables", &id);
    let repo = DiningTableRepository::new(state.db.clone());
    let existing = repo
        .find_by_id(&table_ref)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Table {} not found", table_ref)))?;
    staff.ensure_same_restaurant(&existing.restaurant_id.to_string())?;

    let table = repo.update(&table_ref, payload).await?;

    state.feed.notify(
        resources::TABLES,
        ChangeAction::Update,
        &table.restaurant_id.to_string(),
        table.id.as_ref().map(|id| id.to_string()),
    );

    Ok(Json(table))
}

/// POST /api/tables/:id/close - 关台：结清全部订单并吊销会话
///
/// Settles every open order of the table with the given payment method and
/// revokes its tokens, so the next seating must scan a fresh QR code.
/// Returns the settled orders; an empty list means the table was already
/// free.
pub async fn close(
    State(state): State<ServerState>,
    Extension(staff): Extension<CurrentStaff>,
    Path(id): Path<String>,
    Json(req): Json<CloseTableRequest>,
) -> AppResult<Json<Vec<Order>>> {
    let table_ref = record_ref("tables", &id);

    // The table must belong to the acting staff's restaurant
    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo
        .find_by_id(&table_ref)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Table {} not found", table_ref)))?;
    staff.ensure_same_restaurant(&table.restaurant_id.to_string())?;

    let settled = state
        .workflow
        .close_table(&staff, &table_ref, req.payment_method)
        .await?;
    Ok(Json(settled))
}

fn require_manage(staff: &CurrentStaff) -> AppResult<()> {
    if !staff.role.can_manage() {
        return Err(AppError::forbidden(
            "Managing tables requires a manager account".to_string(),
        ));
    }
    Ok(())
}
