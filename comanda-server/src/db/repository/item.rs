//! Item Repository
//!
//! Ownership is checked by walking Item → Category → Restaurant in SQL.

use super::{RepoError, RepoResult};
use shared::models::{Item, ItemCreate, ItemUpdate, ItemWithCategory};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, category_id, name, description, price, image_path, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Item>> {
    let item = sqlx::query_as::<_, Item>(&format!("SELECT {COLUMNS} FROM item WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(item)
}

/// Find an item by id within a restaurant (Item → Category → Restaurant walk)
pub async fn find_by_id_scoped(
    pool: &SqlitePool,
    id: i64,
    restaurant_id: i64,
) -> RepoResult<Option<Item>> {
    let item = sqlx::query_as::<_, Item>(
        "SELECT i.id, i.category_id, i.name, i.description, i.price, i.image_path, i.created_at, i.updated_at
         FROM item i JOIN category c ON i.category_id = c.id
         WHERE i.id = ? AND c.restaurant_id = ?",
    )
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?;
    Ok(item)
}

/// All items of a restaurant with the category name attached
pub async fn find_all_for_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
) -> RepoResult<Vec<ItemWithCategory>> {
    let items = sqlx::query_as::<_, ItemWithCategory>(
        "SELECT i.id, i.category_id, c.name AS category_name, i.name, i.description, i.price, i.image_path, i.created_at, i.updated_at
         FROM item i JOIN category c ON i.category_id = c.id
         WHERE c.restaurant_id = ?
         ORDER BY i.created_at DESC, i.id DESC",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn create(
    pool: &SqlitePool,
    data: ItemCreate,
    image_path: Option<String>,
) -> RepoResult<Item> {
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO item (category_id, name, description, price, image_path, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(data.category_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(&image_path)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create item".into()))
}

/// Update fields; `new_image_path` replaces the stored path only when present
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: ItemUpdate,
    new_image_path: Option<String>,
) -> RepoResult<Item> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE item SET category_id = COALESCE(?1, category_id), name = COALESCE(?2, name), description = COALESCE(?3, description), price = COALESCE(?4, price), image_path = COALESCE(?5, image_path), updated_at = ?6 WHERE id = ?7",
    )
    .bind(data.category_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(&new_image_path)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Item {id} not found")));
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Item {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    // Live order lines keep a plain FK to item; refuse rather than surface
    // the constraint error
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_item WHERE item_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Err(RepoError::Validation(
            "Cannot delete item that is part of an open order".into(),
        ));
    }

    let rows = sqlx::query("DELETE FROM item WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
