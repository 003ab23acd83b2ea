//! Order API Handlers
//!
//! Thin layer over [`crate::orders::lifecycle`]: parse/validate at the
//! boundary, resolve the caller's restaurant, delegate.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::api::scope;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::lifecycle::{self, TransitionOutcome};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};
use shared::models::{OrderCreate, OrderDetail, OrderStatus, OrderStatusUpdate};

/// Status transition response: either the updated order, or the id of the
/// archive row a completed order moved to
#[derive(Debug, Serialize)]
pub struct StatusTransitionResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_id: Option<i64>,
}

/// GET /api/orders - 当前餐厅的所有订单 (最新在前，含明细)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<OrderDetail>>>> {
    let Some(r) = scope::optional_restaurant(&state.pool, &user).await? else {
        return Ok(ok(Vec::new()));
    };

    let orders = lifecycle::list_orders(&state.pool, r.id).await?;
    Ok(ok(orders))
}

/// GET /api/orders/{id} - 获取单个订单 (含明细)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    let r = scope::require_restaurant(&state.pool, &user).await?;

    let detail = lifecycle::get_order(&state.pool, r.id, id).await?;
    Ok(ok(detail))
}

/// POST /api/orders - 创建订单 (店内端)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    let r = scope::require_restaurant(&state.pool, &user).await?;

    let detail = lifecycle::place_order(&state.pool, r.id, &payload).await?;
    Ok(ok_with_message(detail, "Order created"))
}

/// PUT /api/orders/{id}/status - 状态流转
///
/// `completed` 触发归档并删除在线订单；其余值仅覆盖状态列。
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<AppResponse<StatusTransitionResponse>>> {
    let r = scope::require_restaurant(&state.pool, &user).await?;

    let new_status = OrderStatus::parse(&payload.status).ok_or_else(|| {
        AppError::validation(format!(
            "Invalid status '{}' (expected pending, preparing, ready or completed)",
            payload.status
        ))
    })?;

    let outcome = lifecycle::update_status(&state.pool, r.id, id, new_status).await?;
    let response = match outcome {
        TransitionOutcome::Updated(detail) => ok(StatusTransitionResponse {
            status: detail.status.as_str().to_string(),
            order: Some(detail),
            history_id: None,
        }),
        TransitionOutcome::Archived { history_id } => ok_with_message(
            StatusTransitionResponse {
                status: OrderStatus::Completed.as_str().to_string(),
                order: None,
                history_id: Some(history_id),
            },
            "Order completed and archived",
        ),
    };
    Ok(response)
}

/// DELETE /api/orders/{id} - 取消订单 (硬删除，不归档不计数)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<bool>>> {
    let r = scope::require_restaurant(&state.pool, &user).await?;

    lifecycle::delete_order(&state.pool, r.id, id).await?;
    Ok(ok_with_message(true, "Order deleted"))
}
