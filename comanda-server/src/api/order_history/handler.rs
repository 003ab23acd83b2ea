//! Order History API Handlers

use axum::{Json, extract::State};

use crate::api::scope;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::lifecycle;
use crate::utils::{AppResponse, AppResult, ok};
use shared::models::OrderHistoryDetail;

/// GET /api/order-history - 当前餐厅的归档订单 (最新在前，含明细)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<OrderHistoryDetail>>>> {
    let Some(r) = scope::optional_restaurant(&state.pool, &user).await? else {
        return Ok(ok(Vec::new()));
    };

    let history = lifecycle::list_history(&state.pool, r.id).await?;
    Ok(ok(history))
}
