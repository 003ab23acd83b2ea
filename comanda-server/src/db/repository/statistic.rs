//! Order Statistics Repository
//!
//! Per-(restaurant, item, date) counters. The write path is a single upsert
//! with database-level increments, so concurrent completions of different
//! orders never lose updates.

use super::RepoResult;
use shared::models::{OrderStatistic, StatisticsSummary, TopItem};
use sqlx::SqlitePool;

/// How many items a summary lists
const TOP_ITEMS_LIMIT: i64 = 5;

/// Atomic increment-or-create of one counter row: `quantity_sold +=
/// quantity`, `order_count += 1`.
///
/// Takes any executor so the completion transaction can run it on its own
/// connection.
pub async fn increment<'e, E>(
    executor: E,
    restaurant_id: i64,
    item_id: i64,
    stat_date: &str,
    quantity: i64,
) -> RepoResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "INSERT INTO order_statistic (restaurant_id, item_id, stat_date, quantity_sold, order_count)
         VALUES (?1, ?2, ?3, ?4, 1)
         ON CONFLICT (restaurant_id, item_id, stat_date)
         DO UPDATE SET quantity_sold = quantity_sold + excluded.quantity_sold,
                       order_count = order_count + 1",
    )
    .bind(restaurant_id)
    .bind(item_id)
    .bind(stat_date)
    .bind(quantity)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find(
    pool: &SqlitePool,
    restaurant_id: i64,
    item_id: i64,
    stat_date: &str,
) -> RepoResult<Option<OrderStatistic>> {
    let stat = sqlx::query_as::<_, OrderStatistic>(
        "SELECT id, restaurant_id, item_id, stat_date, quantity_sold, order_count
         FROM order_statistic
         WHERE restaurant_id = ? AND item_id = ? AND stat_date = ?",
    )
    .bind(restaurant_id)
    .bind(item_id)
    .bind(stat_date)
    .fetch_optional(pool)
    .await?;
    Ok(stat)
}

/// Summary over the counters for an inclusive stat_date range: total order
/// count plus the top items by quantity sold.
///
/// Item names resolve against the live catalog; a since-deleted item still
/// counts, under a placeholder name.
pub async fn summary(
    pool: &SqlitePool,
    restaurant_id: i64,
    start_date: &str,
    end_date: &str,
) -> RepoResult<StatisticsSummary> {
    let total_orders = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(order_count), 0) FROM order_statistic
         WHERE restaurant_id = ? AND stat_date BETWEEN ? AND ?",
    )
    .bind(restaurant_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_one(pool)
    .await?;

    let top_items = sqlx::query_as::<_, TopItem>(
        "SELECT os.item_id, COALESCE(i.name, 'Deleted item') AS name, SUM(os.quantity_sold) AS count
         FROM order_statistic os
         LEFT JOIN item i ON os.item_id = i.id
         WHERE os.restaurant_id = ?1 AND os.stat_date BETWEEN ?2 AND ?3
         GROUP BY os.item_id
         ORDER BY count DESC, os.item_id
         LIMIT ?4",
    )
    .bind(restaurant_id)
    .bind(start_date)
    .bind(end_date)
    .bind(TOP_ITEMS_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(StatisticsSummary {
        total_orders,
        top_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{account, category, item, restaurant};
    use crate::db::test_pool;
    use shared::models::{CategoryCreate, ItemCreate, RestaurantCreate};

    async fn seed(pool: &SqlitePool) -> (i64, Vec<i64>) {
        let account = account::create(pool, "O", "o@example.com", "h").await.unwrap();
        let r = restaurant::create(
            pool,
            account.id,
            RestaurantCreate { name: "T".into(), address: "A".into() },
            None,
        )
        .await
        .unwrap();
        let c = category::create(pool, r.id, CategoryCreate { name: "Pizza".into() })
            .await
            .unwrap();
        let mut item_ids = Vec::new();
        for name in ["Margherita", "Diavola", "Funghi", "Capricciosa", "Quattro", "Bianca"] {
            let i = item::create(
                pool,
                ItemCreate {
                    category_id: c.id,
                    name: name.into(),
                    description: None,
                    price: 9.5,
                },
                None,
            )
            .await
            .unwrap();
            item_ids.push(i.id);
        }
        (r.id, item_ids)
    }

    #[tokio::test]
    async fn test_increment_creates_then_accumulates() {
        let pool = test_pool().await;
        let (rid, items) = seed(&pool).await;

        increment(&pool, rid, items[0], "2026-08-05", 2).await.unwrap();
        let s = find(&pool, rid, items[0], "2026-08-05").await.unwrap().unwrap();
        assert_eq!(s.quantity_sold, 2);
        assert_eq!(s.order_count, 1);

        increment(&pool, rid, items[0], "2026-08-05", 3).await.unwrap();
        let s = find(&pool, rid, items[0], "2026-08-05").await.unwrap().unwrap();
        assert_eq!(s.quantity_sold, 5);
        assert_eq!(s.order_count, 2);
    }

    #[tokio::test]
    async fn test_separate_days_independent() {
        let pool = test_pool().await;
        let (rid, items) = seed(&pool).await;

        increment(&pool, rid, items[0], "2026-08-04", 1).await.unwrap();
        increment(&pool, rid, items[0], "2026-08-05", 4).await.unwrap();

        let day1 = find(&pool, rid, items[0], "2026-08-04").await.unwrap().unwrap();
        let day2 = find(&pool, rid, items[0], "2026-08-05").await.unwrap().unwrap();
        assert_eq!(day1.quantity_sold, 1);
        assert_eq!(day2.quantity_sold, 4);
    }

    #[tokio::test]
    async fn test_summary_totals_and_range() {
        let pool = test_pool().await;
        let (rid, items) = seed(&pool).await;

        increment(&pool, rid, items[0], "2026-08-01", 2).await.unwrap();
        increment(&pool, rid, items[0], "2026-08-02", 1).await.unwrap();
        // Outside the queried range
        increment(&pool, rid, items[0], "2026-09-01", 9).await.unwrap();

        let s = summary(&pool, rid, "2026-08-01", "2026-08-31").await.unwrap();
        assert_eq!(s.total_orders, 2);
        assert_eq!(s.top_items.len(), 1);
        assert_eq!(s.top_items[0].count, 3);
        assert_eq!(s.top_items[0].name, "Margherita");
    }

    #[tokio::test]
    async fn test_summary_top_five_descending() {
        let pool = test_pool().await;
        let (rid, items) = seed(&pool).await;

        // Six items with distinct quantities; only the top five come back
        for (idx, item_id) in items.iter().enumerate() {
            increment(&pool, rid, *item_id, "2026-08-05", (idx as i64) + 1)
                .await
                .unwrap();
        }

        let s = summary(&pool, rid, "2026-08-05", "2026-08-05").await.unwrap();
        assert_eq!(s.total_orders, 6);
        assert_eq!(s.top_items.len(), 5);
        assert_eq!(s.top_items[0].count, 6);
        assert_eq!(s.top_items[4].count, 2);
    }

    #[tokio::test]
    async fn test_summary_scoped_to_restaurant() {
        let pool = test_pool().await;
        let (rid, items) = seed(&pool).await;

        increment(&pool, rid, items[0], "2026-08-05", 2).await.unwrap();

        let other = summary(&pool, rid + 1, "2026-08-05", "2026-08-05").await.unwrap();
        assert_eq!(other.total_orders, 0);
        assert!(other.top_items.is_empty());
    }
}
