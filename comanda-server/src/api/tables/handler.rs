//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::scope;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::dining_table;
use crate::utils::validation::validate_table_number;
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate};

/// GET /api/tables - 当前餐厅的所有桌台
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<DiningTable>>>> {
    let Some(r) = scope::optional_restaurant(&state.pool, &user).await? else {
        return Ok(ok(Vec::new()));
    };

    let tables = dining_table::find_all_for_restaurant(&state.pool, r.id).await?;
    Ok(ok(tables))
}

/// GET /api/tables/{id} - 获取单个桌台
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<DiningTable>>> {
    let r = scope::require_restaurant(&state.pool, &user).await?;

    let table = dining_table::find_by_id_scoped(&state.pool, id, r.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Table {id} not found")))?;
    Ok(ok(table))
}

/// POST /api/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<AppResponse<DiningTable>>> {
    let r = scope::require_restaurant(&state.pool, &user).await?;
    validate_table_number(payload.number)?;

    let created = dining_table::create(&state.pool, r.id, payload).await?;
    Ok(ok(created))
}

/// PUT /api/tables/{id} - 更新桌台
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<AppResponse<DiningTable>>> {
    let r = scope::require_restaurant(&state.pool, &user).await?;
    if let Some(number) = payload.number {
        validate_table_number(number)?;
    }

    let updated = dining_table::update(&state.pool, id, r.id, payload).await?;
    Ok(ok(updated))
}

/// DELETE /api/tables/{id} - 删除桌台
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<bool>>> {
    let r = scope::require_restaurant(&state.pool, &user).await?;

    let deleted = dining_table::delete(&state.pool, id, r.id).await?;
    if !deleted {
        return Err(AppError::not_found(format!("Table {id} not found")));
    }
    Ok(ok_with_message(true, "Table deleted"))
}
