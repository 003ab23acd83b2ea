//! Dining Table Repository

use super::{RepoError, RepoResult};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, restaurant_id, number, qr_code_path, created_at";

pub async fn find_all_for_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_table WHERE restaurant_id = ? ORDER BY number"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(tables)
}

pub async fn find_by_id_scoped(
    pool: &SqlitePool,
    id: i64,
    restaurant_id: i64,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_table WHERE id = ? AND restaurant_id = ?"
    ))
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?;
    Ok(table)
}

async fn find_by_number(
    pool: &SqlitePool,
    restaurant_id: i64,
    number: i64,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_table WHERE restaurant_id = ? AND number = ? LIMIT 1"
    ))
    .bind(restaurant_id)
    .bind(number)
    .fetch_optional(pool)
    .await?;
    Ok(table)
}

pub async fn create(
    pool: &SqlitePool,
    restaurant_id: i64,
    data: DiningTableCreate,
) -> RepoResult<DiningTable> {
    // Check duplicate number (schema UNIQUE backs this up)
    if find_by_number(pool, restaurant_id, data.number).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Table {} already exists",
            data.number
        )));
    }

    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO dining_table (restaurant_id, number, qr_code_path, created_at) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(restaurant_id)
    .bind(data.number)
    .bind(&data.qr_code_path)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id_scoped(pool, id, restaurant_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create table".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    restaurant_id: i64,
    data: DiningTableUpdate,
) -> RepoResult<DiningTable> {
    let existing = find_by_id_scoped(pool, id, restaurant_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Table {id} not found")))?;

    if let Some(new_number) = data.number
        && new_number != existing.number
        && find_by_number(pool, restaurant_id, new_number).await?.is_some()
    {
        return Err(RepoError::Duplicate(format!(
            "Table {} already exists",
            new_number
        )));
    }

    sqlx::query(
        "UPDATE dining_table SET number = COALESCE(?1, number), qr_code_path = COALESCE(?2, qr_code_path) WHERE id = ?3",
    )
    .bind(data.number)
    .bind(&data.qr_code_path)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id_scoped(pool, id, restaurant_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Table {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64, restaurant_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM dining_table WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
