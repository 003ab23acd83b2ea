//! Order Lifecycle Service
//!
//! State machine per order: `pending → preparing → ready → completed`.
//! Non-terminal transitions are plain status overwrites. `completed` runs
//! the archival transaction; afterwards the order exists only in history.

use shared::models::{
    Order, OrderCreate, OrderDetail, OrderHistoryDetail, OrderStatus,
};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::repository::{RepoError, order, order_history, statistic};

/// Order lifecycle errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Completion archival failed; the transaction was rolled back and the
    /// live order is untouched
    #[error("Archival failed: {0}")]
    Archival(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        OrderError::Database(e.to_string())
    }
}

impl From<RepoError> for OrderError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) => OrderError::NotFound(msg),
            RepoError::Validation(msg) | RepoError::Duplicate(msg) => OrderError::Validation(msg),
            RepoError::Database(msg) => OrderError::Database(msg),
        }
    }
}

/// Result of a status transition
#[derive(Debug)]
pub enum TransitionOutcome {
    /// Non-terminal transition; the order with its lines
    Updated(OrderDetail),
    /// Terminal transition; the live order is gone, archived under this
    /// history id
    Archived { history_id: i64 },
}

/// Place an order: validate the cart, then insert the order and all its
/// lines transactionally.
///
/// Every referenced item must belong to the ordering restaurant — a foreign
/// or unknown item id is indistinguishable from a missing one.
pub async fn place_order(
    pool: &SqlitePool,
    restaurant_id: i64,
    data: &OrderCreate,
) -> Result<OrderDetail, OrderError> {
    if data.table_number < 1 {
        return Err(OrderError::Validation(
            "table_number must be a positive integer".into(),
        ));
    }
    if data.items.is_empty() {
        return Err(OrderError::Validation(
            "Order must contain at least one item".into(),
        ));
    }
    for line in &data.items {
        if line.quantity < 1 {
            return Err(OrderError::Validation(format!(
                "Quantity for item {} must be at least 1",
                line.item_id
            )));
        }
    }

    // Resolve every referenced item within the ordering restaurant
    for line in &data.items {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM item i JOIN category c ON i.category_id = c.id
             WHERE i.id = ? AND c.restaurant_id = ?",
        )
        .bind(line.item_id)
        .bind(restaurant_id)
        .fetch_one(pool)
        .await?;
        if exists == 0 {
            return Err(OrderError::NotFound(format!(
                "Item {} not found",
                line.item_id
            )));
        }
    }

    let order_id = order::create_with_lines(pool, restaurant_id, data.table_number, &data.items)
        .await
        .map_err(OrderError::from)?;

    tracing::info!(
        order_id,
        restaurant_id,
        table_number = data.table_number,
        line_count = data.items.len(),
        "Order placed"
    );

    let created = order::find_by_id_scoped(pool, order_id, restaurant_id)
        .await?
        .ok_or_else(|| OrderError::Database("Order vanished after insert".into()))?;
    order_detail(pool, &created).await
}

/// All live orders of a restaurant, newest first, lines attached
pub async fn list_orders(
    pool: &SqlitePool,
    restaurant_id: i64,
) -> Result<Vec<OrderDetail>, OrderError> {
    let orders = order::find_all_for_restaurant(pool, restaurant_id).await?;
    let mut details = Vec::with_capacity(orders.len());
    for o in orders {
        details.push(order_detail(pool, &o).await?);
    }
    Ok(details)
}

/// One live order with lines, scoped to a restaurant
pub async fn get_order(
    pool: &SqlitePool,
    restaurant_id: i64,
    order_id: i64,
) -> Result<OrderDetail, OrderError> {
    let o = order::find_by_id_scoped(pool, order_id, restaurant_id)
        .await?
        .ok_or_else(|| OrderError::NotFound(format!("Order {order_id} not found")))?;
    order_detail(pool, &o).await
}

/// Transition an order's status.
///
/// `completed` archives and removes the order; anything else overwrites the
/// status column. The caller has already parsed `new_status`, so an illegal
/// value never reaches this function.
pub async fn update_status(
    pool: &SqlitePool,
    restaurant_id: i64,
    order_id: i64,
    new_status: OrderStatus,
) -> Result<TransitionOutcome, OrderError> {
    let existing = order::find_by_id_scoped(pool, order_id, restaurant_id)
        .await?
        .ok_or_else(|| OrderError::NotFound(format!("Order {order_id} not found")))?;

    if new_status == OrderStatus::Completed {
        let history_id = complete_order(pool, &existing).await?;
        return Ok(TransitionOutcome::Archived { history_id });
    }

    order::set_status(pool, order_id, new_status).await?;
    tracing::info!(order_id, status = new_status.as_str(), "Order status updated");

    let updated = order::find_by_id_scoped(pool, order_id, restaurant_id)
        .await?
        .ok_or_else(|| OrderError::NotFound(format!("Order {order_id} not found")))?;
    Ok(TransitionOutcome::Updated(order_detail(pool, &updated).await?))
}

/// Cancel an order: hard delete, no archival, no statistics
pub async fn delete_order(
    pool: &SqlitePool,
    restaurant_id: i64,
    order_id: i64,
) -> Result<(), OrderError> {
    let deleted = order::delete(pool, order_id, restaurant_id).await?;
    if !deleted {
        return Err(OrderError::NotFound(format!("Order {order_id} not found")));
    }
    tracing::info!(order_id, restaurant_id, "Order deleted without archival");
    Ok(())
}

/// Archived orders of a restaurant, newest first, lines attached
pub async fn list_history(
    pool: &SqlitePool,
    restaurant_id: i64,
) -> Result<Vec<OrderHistoryDetail>, OrderError> {
    let archived = order_history::find_all_for_restaurant(pool, restaurant_id).await?;
    let mut details = Vec::with_capacity(archived.len());
    for h in archived {
        let items = order_history::lines_for_history(pool, h.id).await?;
        details.push(OrderHistoryDetail {
            id: h.id,
            table_number: h.table_number,
            ordered_at: h.ordered_at,
            completed_at: h.completed_at,
            items,
        });
    }
    Ok(details)
}

// =========================================================================
// Completion archival
// =========================================================================

/// One live line with the item snapshot needed for archival
#[derive(sqlx::FromRow)]
struct ArchiveLine {
    item_id: i64,
    quantity: i64,
    special_note: Option<String>,
    item_name: String,
    category_name: Option<String>,
}

fn archival(e: sqlx::Error) -> OrderError {
    OrderError::Archival(e.to_string())
}

/// Archive a completing order: statistics, history copy, live delete — one
/// transaction, so a failure at any step leaves the live order untouched.
///
/// The order row is re-read inside the transaction; if a racing completion
/// got there first the row is gone and this attempt fails with NotFound
/// instead of double-archiving.
async fn complete_order(pool: &SqlitePool, order: &Order) -> Result<i64, OrderError> {
    let mut tx = pool.begin().await.map_err(archival)?;

    let live = sqlx::query_as::<_, Order>(
        "SELECT id, restaurant_id, table_number, status, created_at FROM orders WHERE id = ? AND restaurant_id = ?",
    )
    .bind(order.id)
    .bind(order.restaurant_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(archival)?;

    let Some(live) = live else {
        return Err(OrderError::NotFound(format!(
            "Order {} not found",
            order.id
        )));
    };

    let lines = sqlx::query_as::<_, ArchiveLine>(
        "SELECT oi.item_id, oi.quantity, oi.special_note, i.name AS item_name, c.name AS category_name
         FROM order_item oi
         JOIN item i ON oi.item_id = i.id
         JOIN category c ON i.category_id = c.id
         WHERE oi.order_id = ?
         ORDER BY oi.id",
    )
    .bind(live.id)
    .fetch_all(&mut *tx)
    .await
    .map_err(archival)?;

    // Counters are keyed by the order's creation date
    let stat_date = shared::util::date_of_millis(live.created_at);
    for line in &lines {
        statistic::increment(&mut *tx, live.restaurant_id, line.item_id, &stat_date, line.quantity)
            .await
            .map_err(|e| OrderError::Archival(e.to_string()))?;
    }

    let completed_at = shared::util::now_millis();
    let history_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO order_history (restaurant_id, table_number, ordered_at, completed_at) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(live.restaurant_id)
    .bind(live.table_number)
    .bind(live.created_at)
    .bind(completed_at)
    .fetch_one(&mut *tx)
    .await
    .map_err(archival)?;

    for line in &lines {
        sqlx::query(
            "INSERT INTO order_item_history (order_history_id, item_id, item_name, category_name, quantity, special_note) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(history_id)
        .bind(line.item_id)
        .bind(&line.item_name)
        .bind(&line.category_name)
        .bind(line.quantity)
        .bind(line.special_note.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(archival)?;
    }

    sqlx::query("DELETE FROM order_item WHERE order_id = ?")
        .bind(live.id)
        .execute(&mut *tx)
        .await
        .map_err(archival)?;
    sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(live.id)
        .execute(&mut *tx)
        .await
        .map_err(archival)?;

    tx.commit().await.map_err(archival)?;

    tracing::info!(
        order_id = live.id,
        history_id,
        line_count = lines.len(),
        "Order completed and archived"
    );

    Ok(history_id)
}

async fn order_detail(pool: &SqlitePool, order: &Order) -> Result<OrderDetail, OrderError> {
    let items = order::lines_for_order(pool, order.id).await?;
    Ok(OrderDetail {
        id: order.id,
        table_number: order.table_number,
        status: order.status,
        created_at: order.created_at,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{account, category, item, restaurant};
    use crate::db::test_pool;
    use shared::models::{CategoryCreate, ItemCreate, OrderLineInput, RestaurantCreate};

    struct Fixture {
        restaurant_id: i64,
        item_id: i64,
        second_item_id: i64,
    }

    async fn seed(pool: &SqlitePool, email: &str) -> Fixture {
        let account = account::create(pool, "Owner", email, "hash").await.unwrap();
        let r = restaurant::create(
            pool,
            account.id,
            RestaurantCreate {
                name: "Trattoria".into(),
                address: "Via Roma 1".into(),
            },
            None,
        )
        .await
        .unwrap();
        let c = category::create(pool, r.id, CategoryCreate { name: "Pizza".into() })
            .await
            .unwrap();
        let first = item::create(
            pool,
            ItemCreate {
                category_id: c.id,
                name: "Margherita".into(),
                description: None,
                price: 9.5,
            },
            None,
        )
        .await
        .unwrap();
        let second = item::create(
            pool,
            ItemCreate {
                category_id: c.id,
                name: "Diavola".into(),
                description: None,
                price: 11.0,
            },
            None,
        )
        .await
        .unwrap();
        Fixture {
            restaurant_id: r.id,
            item_id: first.id,
            second_item_id: second.id,
        }
    }

    fn cart(fix: &Fixture) -> OrderCreate {
        OrderCreate {
            table_number: 4,
            items: vec![OrderLineInput {
                item_id: fix.item_id,
                quantity: 2,
                special_note: Some("no salt".into()),
            }],
        }
    }

    #[tokio::test]
    async fn test_place_order_creates_order_and_lines() {
        let pool = test_pool().await;
        let fix = seed(&pool, "a@example.com").await;

        let detail = place_order(&pool, fix.restaurant_id, &cart(&fix)).await.unwrap();
        assert_eq!(detail.status, OrderStatus::Pending);
        assert_eq!(detail.table_number, 4);
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].quantity, 2);
        assert_eq!(detail.items[0].item_name, "Margherita");

        let order_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE restaurant_id = ?",
        )
        .bind(fix.restaurant_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(order_count, 1);
        let line_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_item")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(line_count, 1);
    }

    #[tokio::test]
    async fn test_place_order_validation() {
        let pool = test_pool().await;
        let fix = seed(&pool, "a@example.com").await;

        let mut bad_table = cart(&fix);
        bad_table.table_number = 0;
        assert!(matches!(
            place_order(&pool, fix.restaurant_id, &bad_table).await,
            Err(OrderError::Validation(_))
        ));

        let empty = OrderCreate { table_number: 4, items: vec![] };
        assert!(matches!(
            place_order(&pool, fix.restaurant_id, &empty).await,
            Err(OrderError::Validation(_))
        ));

        let mut bad_qty = cart(&fix);
        bad_qty.items[0].quantity = 0;
        assert!(matches!(
            place_order(&pool, fix.restaurant_id, &bad_qty).await,
            Err(OrderError::Validation(_))
        ));

        // Nothing was written by any of the rejected carts
        let order_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(order_count, 0);
    }

    #[tokio::test]
    async fn test_place_order_unknown_item() {
        let pool = test_pool().await;
        let fix = seed(&pool, "a@example.com").await;

        let mut unknown = cart(&fix);
        unknown.items[0].item_id = 9999;
        assert!(matches!(
            place_order(&pool, fix.restaurant_id, &unknown).await,
            Err(OrderError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_place_order_rejects_foreign_item() {
        let pool = test_pool().await;
        let fix = seed(&pool, "a@example.com").await;
        let other = seed(&pool, "b@example.com").await;

        // The other restaurant's item cannot be ordered here
        let mut foreign = cart(&fix);
        foreign.items[0].item_id = other.item_id;
        assert!(matches!(
            place_order(&pool, fix.restaurant_id, &foreign).await,
            Err(OrderError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_non_terminal_transition_overwrites() {
        let pool = test_pool().await;
        let fix = seed(&pool, "a@example.com").await;
        let placed = place_order(&pool, fix.restaurant_id, &cart(&fix)).await.unwrap();

        let outcome =
            update_status(&pool, fix.restaurant_id, placed.id, OrderStatus::Preparing)
                .await
                .unwrap();
        let TransitionOutcome::Updated(detail) = outcome else {
            panic!("expected Updated outcome");
        };
        assert_eq!(detail.status, OrderStatus::Preparing);
        assert_eq!(detail.items.len(), 1);

        // No archival side effects
        let history = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_history")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(history, 0);
    }

    #[tokio::test]
    async fn test_complete_archives_counts_and_removes() {
        let pool = test_pool().await;
        let fix = seed(&pool, "a@example.com").await;
        let placed = place_order(&pool, fix.restaurant_id, &cart(&fix)).await.unwrap();

        let outcome =
            update_status(&pool, fix.restaurant_id, placed.id, OrderStatus::Completed)
                .await
                .unwrap();
        let TransitionOutcome::Archived { history_id } = outcome else {
            panic!("expected Archived outcome");
        };

        // Live order is gone
        assert!(matches!(
            get_order(&pool, fix.restaurant_id, placed.id).await,
            Err(OrderError::NotFound(_))
        ));
        assert!(list_orders(&pool, fix.restaurant_id).await.unwrap().is_empty());

        // History copy is identical
        let history = list_history(&pool, fix.restaurant_id).await.unwrap();
        assert_eq!(history.len(), 1);
        let archived = &history[0];
        assert_eq!(archived.id, history_id);
        assert_eq!(archived.table_number, 4);
        assert_eq!(archived.ordered_at, placed.created_at);
        assert_eq!(archived.items.len(), 1);
        assert_eq!(archived.items[0].item_id, fix.item_id);
        assert_eq!(archived.items[0].quantity, 2);
        assert_eq!(archived.items[0].special_note.as_deref(), Some("no salt"));
        assert_eq!(archived.items[0].item_name, "Margherita");
        assert_eq!(archived.items[0].category_name.as_deref(), Some("Pizza"));

        // Counter bumped by exactly (quantity, 1) under the creation date
        let stat_date = shared::util::date_of_millis(placed.created_at);
        let stat = statistic::find(&pool, fix.restaurant_id, fix.item_id, &stat_date)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stat.quantity_sold, 2);
        assert_eq!(stat.order_count, 1);

        // Summary over today sees it
        let summary = statistic::summary(&pool, fix.restaurant_id, &stat_date, &stat_date)
            .await
            .unwrap();
        assert!(summary.total_orders >= 1);
        let top = summary
            .top_items
            .iter()
            .find(|t| t.item_id == fix.item_id)
            .expect("ordered item in top items");
        assert!(top.count >= 2);
    }

    #[tokio::test]
    async fn test_complete_twice_rejected() {
        let pool = test_pool().await;
        let fix = seed(&pool, "a@example.com").await;
        let placed = place_order(&pool, fix.restaurant_id, &cart(&fix)).await.unwrap();

        update_status(&pool, fix.restaurant_id, placed.id, OrderStatus::Completed)
            .await
            .unwrap();
        let second =
            update_status(&pool, fix.restaurant_id, placed.id, OrderStatus::Completed).await;
        assert!(matches!(second, Err(OrderError::NotFound(_))));

        // Exactly one archive, counters bumped exactly once
        let history_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_history")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(history_count, 1);

        let stat_date = shared::util::date_of_millis(placed.created_at);
        let stat = statistic::find(&pool, fix.restaurant_id, fix.item_id, &stat_date)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stat.quantity_sold, 2);
        assert_eq!(stat.order_count, 1);
    }

    #[tokio::test]
    async fn test_complete_multi_line_counts_each_item() {
        let pool = test_pool().await;
        let fix = seed(&pool, "a@example.com").await;

        let order = OrderCreate {
            table_number: 7,
            items: vec![
                OrderLineInput { item_id: fix.item_id, quantity: 2, special_note: None },
                OrderLineInput { item_id: fix.second_item_id, quantity: 3, special_note: None },
            ],
        };
        let placed = place_order(&pool, fix.restaurant_id, &order).await.unwrap();
        update_status(&pool, fix.restaurant_id, placed.id, OrderStatus::Completed)
            .await
            .unwrap();

        let stat_date = shared::util::date_of_millis(placed.created_at);
        let first = statistic::find(&pool, fix.restaurant_id, fix.item_id, &stat_date)
            .await
            .unwrap()
            .unwrap();
        let second = statistic::find(&pool, fix.restaurant_id, fix.second_item_id, &stat_date)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.quantity_sold, 2);
        assert_eq!(first.order_count, 1);
        assert_eq!(second.quantity_sold, 3);
        assert_eq!(second.order_count, 1);
    }

    #[tokio::test]
    async fn test_stat_date_is_creation_date() {
        let pool = test_pool().await;
        let fix = seed(&pool, "a@example.com").await;
        let placed = place_order(&pool, fix.restaurant_id, &cart(&fix)).await.unwrap();

        // Pretend the order was placed on an earlier day
        let past = 1_704_067_200_000; // 2024-01-01 UTC
        sqlx::query("UPDATE orders SET created_at = ? WHERE id = ?")
            .bind(past)
            .bind(placed.id)
            .execute(&pool)
            .await
            .unwrap();

        update_status(&pool, fix.restaurant_id, placed.id, OrderStatus::Completed)
            .await
            .unwrap();

        let stat = statistic::find(&pool, fix.restaurant_id, fix.item_id, "2024-01-01")
            .await
            .unwrap();
        assert!(stat.is_some(), "counter keyed by the order's creation date");
    }

    #[tokio::test]
    async fn test_delete_order_skips_archival_and_stats() {
        let pool = test_pool().await;
        let fix = seed(&pool, "a@example.com").await;
        let placed = place_order(&pool, fix.restaurant_id, &cart(&fix)).await.unwrap();

        delete_order(&pool, fix.restaurant_id, placed.id).await.unwrap();

        assert!(list_orders(&pool, fix.restaurant_id).await.unwrap().is_empty());
        let history_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_history")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(history_count, 0);
        let stat_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_statistic")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stat_count, 0);

        // Deleting again is NotFound
        assert!(matches!(
            delete_order(&pool, fix.restaurant_id, placed.id).await,
            Err(OrderError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cross_tenant_order_invisible() {
        let pool = test_pool().await;
        let fix = seed(&pool, "a@example.com").await;
        let other = seed(&pool, "b@example.com").await;
        let placed = place_order(&pool, fix.restaurant_id, &cart(&fix)).await.unwrap();

        assert!(matches!(
            update_status(&pool, other.restaurant_id, placed.id, OrderStatus::Ready).await,
            Err(OrderError::NotFound(_))
        ));
        assert!(matches!(
            delete_order(&pool, other.restaurant_id, placed.id).await,
            Err(OrderError::NotFound(_))
        ));
        assert!(list_orders(&pool, other.restaurant_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_history_newest_first() {
        let pool = test_pool().await;
        let fix = seed(&pool, "a@example.com").await;

        let first = place_order(&pool, fix.restaurant_id, &cart(&fix)).await.unwrap();
        update_status(&pool, fix.restaurant_id, first.id, OrderStatus::Completed)
            .await
            .unwrap();

        let mut second_cart = cart(&fix);
        second_cart.table_number = 9;
        let second = place_order(&pool, fix.restaurant_id, &second_cart).await.unwrap();
        update_status(&pool, fix.restaurant_id, second.id, OrderStatus::Completed)
            .await
            .unwrap();

        let history = list_history(&pool, fix.restaurant_id).await.unwrap();
        assert_eq!(history.len(), 2);
        // Same-millisecond completions fall back to id DESC
        assert_eq!(history[0].table_number, 9);
        assert_eq!(history[1].table_number, 4);
    }

    #[tokio::test]
    async fn test_sales_report_after_completion() {
        let pool = test_pool().await;
        let fix = seed(&pool, "a@example.com").await;
        let placed = place_order(&pool, fix.restaurant_id, &cart(&fix)).await.unwrap();
        update_status(&pool, fix.restaurant_id, placed.id, OrderStatus::Completed)
            .await
            .unwrap();

        let now = shared::util::now_millis();
        let report = order_history::sales_report(&pool, fix.restaurant_id, 0, now + 1)
            .await
            .unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].item_id, fix.item_id);
        assert_eq!(report[0].total_sold, 2);
        assert_eq!(report[0].category_name.as_deref(), Some("Pizza"));
    }
}
