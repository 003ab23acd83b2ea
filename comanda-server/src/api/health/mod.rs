//! Health API 模块

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult, ok};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

/// GET /api/health - 健康检查 (含数据库 ping)
async fn health(State(state): State<ServerState>) -> AppResult<Json<AppResponse<HealthResponse>>> {
    let database = match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.pool)
        .await
    {
        Ok(_) => "ok",
        Err(e) => {
            tracing::error!(error = %e, "Health check database ping failed");
            "error"
        }
    };

    Ok(ok(HealthResponse {
        status: "ok",
        database,
    }))
}
