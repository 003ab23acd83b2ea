//! Statistics API Handlers
//!
//! Reads the precomputed per-(restaurant, item, date) counters; the sales
//! report in [`crate::api::reports`] recomputes from history instead.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::api::scope;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::statistic;
use crate::utils::{AppResponse, AppResult, ok, time};
use shared::models::StatisticsSummary;

#[derive(Debug, Deserialize)]
pub struct StatisticsQuery {
    #[serde(default = "default_period")]
    pub period: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn default_period() -> String {
    "today".to_string()
}

/// GET /api/statistics - 销量统计汇总
///
/// period ∈ today | this_week | this_month | custom (需带 start_date/end_date)
pub async fn summary(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<StatisticsQuery>,
) -> AppResult<Json<AppResponse<StatisticsSummary>>> {
    let Some(r) = scope::optional_restaurant(&state.pool, &user).await? else {
        return Ok(ok(StatisticsSummary {
            total_orders: 0,
            top_items: Vec::new(),
        }));
    };

    let (start, end) = time::resolve_period(
        &query.period,
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    )?;

    tracing::debug!(
        period = %query.period,
        start = %start,
        end = %end,
        "Fetching statistics summary"
    );

    let summary = statistic::summary(
        &state.pool,
        r.id,
        &start.format("%Y-%m-%d").to_string(),
        &end.format("%Y-%m-%d").to_string(),
    )
    .await?;

    Ok(ok(summary))
}
