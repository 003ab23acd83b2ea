//! Reports API Handlers
//!
//! Recomputes sales figures from the archived history tables — the system
//! of record — rather than the statistics counters.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::api::scope;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::order_history;
use crate::utils::{AppResponse, AppResult, ok, time};
use shared::models::SalesReport;

#[derive(Debug, Deserialize)]
pub struct SalesReportQuery {
    #[serde(default = "default_filter")]
    pub filter: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn default_filter() -> String {
    "today".to_string()
}

/// GET /api/reports/sales-summary - 销售报表 (按菜品汇总)
///
/// filter ∈ today | this_month | custom (需带 start_date/end_date)
pub async fn sales_summary(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<SalesReportQuery>,
) -> AppResult<Json<AppResponse<SalesReport>>> {
    let (start, end) = time::resolve_period(
        &query.filter,
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    )?;

    let Some(r) = scope::optional_restaurant(&state.pool, &user).await? else {
        return Ok(ok(SalesReport {
            start_date: start.format("%Y-%m-%d").to_string(),
            end_date: end.format("%Y-%m-%d").to_string(),
            items: Vec::new(),
        }));
    };

    let items = order_history::sales_report(
        &state.pool,
        r.id,
        time::day_start_millis(start),
        time::day_end_millis(end),
    )
    .await?;

    Ok(ok(SalesReport {
        start_date: start.format("%Y-%m-%d").to_string(),
        end_date: end.format("%Y-%m-%d").to_string(),
        items,
    }))
}
