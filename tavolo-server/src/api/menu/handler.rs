//! 顾客菜单 Handler

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::TableSession;

use crate::api::convert::record_ref;
use crate::core::ServerState;
use crate::db::models::{Category, DiningTable, Product, Restaurant};
use crate::db::repository::{
    CategoryRepository, DiningTableRepository, ProductRepository, RestaurantRepository,
};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Everything the customer page needs after a successful session check
#[derive(Debug, Serialize)]
pub struct MenuPayload {
    pub restaurant: Restaurant,
    pub table: DiningTable,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    /// Validated session, including any stored party size
    pub session: TableSession,
    /// Whether AYCE pricing currently applies
    pub ayce_active: bool,
}

/// GET /api/menu/:restaurant_id/:table_id?token= - 顾客菜单
pub async fn menu(
    State(state): State<ServerState>,
    Path((restaurant_id, table_id)): Path<(String, String)>,
    Query(query): Query<TokenQuery>,
) -> AppResult<Json<MenuPayload>> {
    let restaurant_ref = record_ref("restaurants", &restaurant_id);
    let table_ref = record_ref("tables", &table_id);

    // Session check comes first; nothing else is fetched for a bad token
    let session = state
        .gate
        .validate_entry(&restaurant_ref, &table_ref, query.token.as_deref())
        .await?;

    let restaurant = RestaurantRepository::new(state.db.clone())
        .find_by_id(&restaurant_ref)
        .await?
        .filter(|r| r.is_active)
        .ok_or_else(|| AppError::not_found("Restaurant not found".to_string()))?;
    let table = DiningTableRepository::new(state.db.clone())
        .find_by_id(&table_ref)
        .await?
        .ok_or_else(|| AppError::not_found("Table not found".to_string()))?;
    let categories = CategoryRepository::new(state.db.clone())
        .find_for_restaurant(&restaurant_ref)
        .await?;
    let products = ProductRepository::new(state.db.clone())
        .find_available(&restaurant_ref)
        .await?;

    let ayce_active = restaurant.ayce_active();
    Ok(Json(MenuPayload {
        restaurant,
        table,
        categories,
        products,
        session,
        ayce_active,
    }))
}
