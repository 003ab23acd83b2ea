//! Order History Repository
//!
//! Read side of the archive. Writes happen inside the completion transaction
//! in `orders::lifecycle`; nothing here ever mutates history.

use super::RepoResult;
use shared::models::{OrderHistory, OrderHistoryLine, SalesReportItem};
use sqlx::SqlitePool;

/// All archived orders of a restaurant, newest first
pub async fn find_all_for_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
) -> RepoResult<Vec<OrderHistory>> {
    let orders = sqlx::query_as::<_, OrderHistory>(
        "SELECT id, restaurant_id, table_number, ordered_at, completed_at
         FROM order_history WHERE restaurant_id = ?
         ORDER BY completed_at DESC, id DESC",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

/// Archived lines of one history order
pub async fn lines_for_history(
    pool: &SqlitePool,
    order_history_id: i64,
) -> RepoResult<Vec<OrderHistoryLine>> {
    let lines = sqlx::query_as::<_, OrderHistoryLine>(
        "SELECT item_id, item_name, category_name, quantity, special_note
         FROM order_item_history WHERE order_history_id = ?
         ORDER BY id",
    )
    .bind(order_history_id)
    .fetch_all(pool)
    .await?;
    Ok(lines)
}

/// Sales report: recompute per-item totals from the archive over a
/// completed_at range (`start` inclusive, `end` exclusive, Unix millis).
///
/// Item and category names come from the archived snapshot, so the report
/// survives later menu edits and deletions.
pub async fn sales_report(
    pool: &SqlitePool,
    restaurant_id: i64,
    start_millis: i64,
    end_millis: i64,
) -> RepoResult<Vec<SalesReportItem>> {
    let items = sqlx::query_as::<_, SalesReportItem>(
        "SELECT oih.item_id, oih.item_name, oih.category_name, SUM(oih.quantity) AS total_sold
         FROM order_item_history oih
         JOIN order_history oh ON oih.order_history_id = oh.id
         WHERE oh.restaurant_id = ? AND oh.completed_at >= ? AND oh.completed_at < ?
         GROUP BY oih.item_id, oih.item_name, oih.category_name
         ORDER BY total_sold DESC",
    )
    .bind(restaurant_id)
    .bind(start_millis)
    .bind(end_millis)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    async fn seed_history(pool: &SqlitePool, rid: i64, completed_at: i64, qty: i64) -> i64 {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO order_history (restaurant_id, table_number, ordered_at, completed_at) VALUES (?, 4, ?, ?) RETURNING id",
        )
        .bind(rid)
        .bind(completed_at - 1000)
        .bind(completed_at)
        .fetch_one(pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO order_item_history (order_history_id, item_id, item_name, category_name, quantity) VALUES (?, 1, 'Margherita', 'Pizza', ?)",
        )
        .bind(id)
        .bind(qty)
        .execute(pool)
        .await
        .unwrap();
        id
    }

    async fn seed_restaurant(pool: &SqlitePool) -> i64 {
        let account = crate::db::repository::account::create(pool, "O", "o@example.com", "h")
            .await
            .unwrap();
        crate::db::repository::restaurant::create(
            pool,
            account.id,
            shared::models::RestaurantCreate {
                name: "T".into(),
                address: "A".into(),
            },
            None,
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let pool = test_pool().await;
        let rid = seed_restaurant(&pool).await;
        seed_history(&pool, rid, 1_000, 1).await;
        let newer = seed_history(&pool, rid, 2_000, 1).await;

        let all = find_all_for_restaurant(&pool, rid).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, newer);
    }

    #[tokio::test]
    async fn test_sales_report_sums_and_bounds() {
        let pool = test_pool().await;
        let rid = seed_restaurant(&pool).await;
        seed_history(&pool, rid, 1_000, 2).await;
        seed_history(&pool, rid, 2_000, 3).await;
        // Outside the queried range (end is exclusive)
        seed_history(&pool, rid, 5_000, 7).await;

        let report = sales_report(&pool, rid, 0, 5_000).await.unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].item_name, "Margherita");
        assert_eq!(report[0].category_name.as_deref(), Some("Pizza"));
        assert_eq!(report[0].total_sold, 5);
    }
}
