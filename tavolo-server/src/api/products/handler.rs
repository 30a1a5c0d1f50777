//! 菜单管理 Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use shared::ChangeAction;

use crate::api::convert::record_ref;
use crate::auth::CurrentStaff;
use crate::core::ServerState;
use crate::db::models::{Category, Product, ProductCreate, ProductUpdate};
use crate::db::repository::{CategoryRepository, ProductRepository};
use crate::realtime::resources;
use crate::utils::validation::{validate_name, validate_price};
use crate::utils::{AppError, AppResult};

/// GET /api/products - 当前餐厅的全部商品（含下架）
pub async fn list(
    State(state): State<ServerState>,
    Extension(staff): Extension<CurrentStaff>,
) -> AppResult<Json<Vec<Product>>> {
    let restaurant_id = staff.restaurant_id()?;
    let repo = ProductRepository::new(state.db.clone());
    let products = repo.find_for_restaurant(restaurant_id).await?;
    Ok(Json(products))
}

/// GET /api/categories - 当前餐厅的分类
pub async fn list_categories(
    State(state): State<ServerState>,
    Extension(staff): Extension<CurrentStaff>,
) -> AppResult<Json<Vec<Category>>> {
    let restaurant_id = staff.restaurant_id()?;
    let repo = CategoryRepository::new(state.db.clone());
    let categories = repo.find_for_restaurant(restaurant_id).await?;
    Ok(Json(categories))
}

/// POST /api/products - 新建商品
pub async fn create(
    State(state): State<ServerState>,
    Extension(staff): Extension<CurrentStaff>,
    Json(mut payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    require_manage(&staff)?;
    validate_name(&payload.name, "product name")?;
    validate_price(payload.price, "price")?;
    let restaurant_id = staff.restaurant_id()?.to_string();
    payload.category_id = record_ref("categories", &payload.category_id);

    // Category must exist within the same restaurant
    let category = CategoryRepository::new(state.db.clone())
        .find_by_id(&payload.category_id)
        .await?
        .ok_or_else(|| AppError::not_found("Category not found".to_string()))?;
    staff.ensure_same_restaurant(&category.restaurant_id.to_string())?;

    let repo = ProductRepository::new(state.db.clone());
    let product = repo.create(&restaurant_id, payload).await?;

    state.feed.notify(
        resources::PRODUCTS,
        ChangeAction::Insert,
        &restaurant_id,
        product.id.as_ref().map(|id| id.to_string()),
    );

    Ok(Json(product))
}

/// PUT /api/products/:id - 更新商品（含上下架、AYCE 限购）
pub async fn update(
    State(state): State<ServerState>,
    Extension(staff): Extension<CurrentStaff>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    require_manage(&staff)?;
    if let Some(name) = &payload.name {
        validate_name(name, "product name")?;
    }
    if let Some(price) = payload.price {
        validate_price(price, "price")?;
    }

    let product_ref = record_ref("products", &id);
    let repo = ProductRepository::new(state.db.clone());
    let existing = repo
        .find_by_id(&product_ref)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", product_ref)))?;
    staff.ensure_same_restaurant(&existing.restaurant_id.to_string())?;

    let product = repo.update(&product_ref, payload).await?;

    state.feed.notify(
        resources::PRODUCTS,
        ChangeAction::Update,
        &product.restaurant_id.to_string(),
        product.id.as_ref().map(|id| id.to_string()),
    );

    Ok(Json(product))
}

fn require_manage(staff: &CurrentStaff) -> AppResult<()> {
    if !staff.role.can_manage() {
        return Err(AppError::forbidden(
            "Managing the menu requires a manager account".to_string(),
        ));
    }
    Ok(())
}
