//! Statistics Models

use serde::{Deserialize, Serialize};

/// Per-(restaurant, item, date) sales counter row.
///
/// `stat_date` is the UTC calendar date (YYYY-MM-DD) of the order's
/// creation; counters only ever move forward via atomic increments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderStatistic {
    pub id: i64,
    pub restaurant_id: i64,
    pub item_id: i64,
    pub stat_date: String,
    pub quantity_sold: i64,
    pub order_count: i64,
}

/// One of the top-selling items in a summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TopItem {
    pub item_id: i64,
    pub name: String,
    pub count: i64,
}

/// Summary over the precomputed counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub total_orders: i64,
    pub top_items: Vec<TopItem>,
}

/// One line of the sales report (recomputed from history)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SalesReportItem {
    pub item_id: i64,
    pub item_name: String,
    pub category_name: Option<String>,
    pub total_sold: i64,
}

/// Sales report response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesReport {
    pub start_date: String,
    pub end_date: String,
    pub items: Vec<SalesReportItem>,
}
