//! Restaurant Repository
//!
//! One restaurant per owner account; the account_id column carries a UNIQUE
//! constraint but the duplicate is caught here first for a clean error.

use super::{RepoError, RepoResult};
use shared::models::{Restaurant, RestaurantCreate, RestaurantUpdate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, account_id, name, address, profile_image, created_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Restaurant>> {
    let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
        "SELECT {COLUMNS} FROM restaurant WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(restaurant)
}

/// Resolve the caller's restaurant — the entry point of every scoped request
pub async fn find_by_account(pool: &SqlitePool, account_id: i64) -> RepoResult<Option<Restaurant>> {
    let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
        "SELECT {COLUMNS} FROM restaurant WHERE account_id = ? LIMIT 1"
    ))
    .bind(account_id)
    .fetch_optional(pool)
    .await?;
    Ok(restaurant)
}

pub async fn create(
    pool: &SqlitePool,
    account_id: i64,
    data: RestaurantCreate,
    profile_image: Option<String>,
) -> RepoResult<Restaurant> {
    if find_by_account(pool, account_id).await?.is_some() {
        return Err(RepoError::Duplicate(
            "Account already owns a restaurant".into(),
        ));
    }

    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO restaurant (account_id, name, address, profile_image, created_at) VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(account_id)
    .bind(&data.name)
    .bind(&data.address)
    .bind(&profile_image)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create restaurant".into()))
}

/// Update name/address; `new_profile_image` replaces the stored path only
/// when present.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: RestaurantUpdate,
    new_profile_image: Option<String>,
) -> RepoResult<Restaurant> {
    let rows = sqlx::query(
        "UPDATE restaurant SET name = COALESCE(?1, name), address = COALESCE(?2, address), profile_image = COALESCE(?3, profile_image) WHERE id = ?4",
    )
    .bind(&data.name)
    .bind(&data.address)
    .bind(&new_profile_image)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Restaurant {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Restaurant {id} not found")))
}

/// Hard delete; categories, items, tables and orders go with it via
/// ON DELETE CASCADE.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM restaurant WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
