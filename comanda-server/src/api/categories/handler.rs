//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::scope;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::category;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};
use shared::models::{Category, CategoryCreate, CategoryUpdate, CategoryWithItems};

/// GET /api/categories - 当前餐厅的所有分类 (含菜品，最新在前)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<CategoryWithItems>>>> {
    // Callers without a restaurant get an empty list, not an error
    let Some(r) = scope::optional_restaurant(&state.pool, &user).await? else {
        return Ok(ok(Vec::new()));
    };

    let categories = category::find_all_with_items(&state.pool, r.id).await?;
    Ok(ok(categories))
}

/// GET /api/categories/{id} - 获取单个分类 (含菜品)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<CategoryWithItems>>> {
    let r = scope::require_restaurant(&state.pool, &user).await?;

    let with_items = category::find_with_items(&state.pool, id, r.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))?;

    Ok(ok(with_items))
}

/// POST /api/categories - 创建分类
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<AppResponse<Category>>> {
    let r = scope::require_restaurant(&state.pool, &user).await?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    let created = category::create(&state.pool, r.id, payload).await?;
    Ok(ok(created))
}

/// PUT /api/categories/{id} - 更新分类
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<AppResponse<Category>>> {
    let r = scope::require_restaurant(&state.pool, &user).await?;
    if let Some(ref name) = payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }

    let updated = category::update(&state.pool, id, r.id, payload).await?;
    Ok(ok(updated))
}

/// DELETE /api/categories/{id} - 删除分类 (有菜品时拒绝)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<bool>>> {
    let r = scope::require_restaurant(&state.pool, &user).await?;

    let deleted = category::delete(&state.pool, id, r.id).await?;
    Ok(ok_with_message(deleted, "Category deleted"))
}
