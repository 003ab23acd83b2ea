//! Live Order Repository
//!
//! Order + line creation is transactional: a failure on any line rolls the
//! whole order back, so an order with no lines can never be observed.

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderLineDetail, OrderLineInput, OrderStatus};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, restaurant_id, table_number, status, created_at";

pub async fn find_by_id_scoped(
    pool: &SqlitePool,
    id: i64,
    restaurant_id: i64,
) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE id = ? AND restaurant_id = ?"
    ))
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?;
    Ok(order)
}

/// All live orders of a restaurant, newest first
pub async fn find_all_for_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE restaurant_id = ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

/// Lines of one order with the referenced item attached
pub async fn lines_for_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderLineDetail>> {
    let lines = sqlx::query_as::<_, OrderLineDetail>(
        "SELECT oi.id, oi.item_id, i.name AS item_name, i.price, oi.quantity, oi.special_note
         FROM order_item oi JOIN item i ON oi.item_id = i.id
         WHERE oi.order_id = ?
         ORDER BY oi.id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(lines)
}

/// Insert the order row and all of its lines in one transaction; returns the
/// new order id. Line items must already be validated against the restaurant.
pub async fn create_with_lines(
    pool: &SqlitePool,
    restaurant_id: i64,
    table_number: i64,
    lines: &[OrderLineInput],
) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let order_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO orders (restaurant_id, table_number, status, created_at) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(restaurant_id)
    .bind(table_number)
    .bind(OrderStatus::Pending)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    for line in lines {
        sqlx::query(
            "INSERT INTO order_item (order_id, item_id, quantity, special_note) VALUES (?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(line.item_id)
        .bind(line.quantity)
        .bind(line.special_note.as_deref())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(order_id)
}

/// Overwrite the status column (non-terminal transitions only; completion
/// goes through the lifecycle service)
pub async fn set_status(pool: &SqlitePool, id: i64, status: OrderStatus) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}

/// Hard delete (cancellation): no archival, no statistics; lines go via
/// ON DELETE CASCADE
pub async fn delete(pool: &SqlitePool, id: i64, restaurant_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM orders WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{account, category, item, restaurant};
    use crate::db::test_pool;
    use shared::models::{CategoryCreate, ItemCreate, RestaurantCreate};

    async fn seed(pool: &SqlitePool, email: &str) -> (i64, i64) {
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
        let i = item::create(
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
        (r.id, i.id)
    }

    #[tokio::test]
    async fn test_create_with_lines() {
        let pool = test_pool().await;
        let (rid, item_id) = seed(&pool, "a@example.com").await;

        let order_id = create_with_lines(
            &pool,
            rid,
            4,
            &[
                OrderLineInput {
                    item_id,
                    quantity: 2,
                    special_note: Some("no salt".into()),
                },
                OrderLineInput {
                    item_id,
                    quantity: 1,
                    special_note: None,
                },
            ],
        )
        .await
        .unwrap();

        let order = find_by_id_scoped(&pool, order_id, rid).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.table_number, 4);

        let lines = lines_for_order(&pool, order_id).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].item_name, "Margherita");
        assert_eq!(lines[0].special_note.as_deref(), Some("no salt"));
    }

    #[tokio::test]
    async fn test_create_rolls_back_on_bad_line() {
        let pool = test_pool().await;
        let (rid, item_id) = seed(&pool, "a@example.com").await;

        // Second line violates the quantity CHECK; the whole order must
        // roll back
        let result = create_with_lines(
            &pool,
            rid,
            4,
            &[
                OrderLineInput { item_id, quantity: 1, special_note: None },
                OrderLineInput { item_id, quantity: 0, special_note: None },
            ],
        )
        .await;
        assert!(result.is_err());

        let orders = find_all_for_restaurant(&pool, rid).await.unwrap();
        assert!(orders.is_empty());
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_item")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_set_status_overwrites() {
        let pool = test_pool().await;
        let (rid, item_id) = seed(&pool, "a@example.com").await;
        let order_id = create_with_lines(
            &pool,
            rid,
            4,
            &[OrderLineInput { item_id, quantity: 1, special_note: None }],
        )
        .await
        .unwrap();

        set_status(&pool, order_id, OrderStatus::Preparing).await.unwrap();
        let order = find_by_id_scoped(&pool, order_id, rid).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn test_delete_cascades_lines() {
        let pool = test_pool().await;
        let (rid, item_id) = seed(&pool, "a@example.com").await;
        let order_id = create_with_lines(
            &pool,
            rid,
            4,
            &[OrderLineInput { item_id, quantity: 1, special_note: None }],
        )
        .await
        .unwrap();

        assert!(delete(&pool, order_id, rid).await.unwrap());
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_item")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
