//! Category Repository
//!
//! Name uniqueness is per restaurant, case-sensitive, and enforced here at
//! the application layer (no schema UNIQUE on purpose — legacy data may
//! carry duplicates).

use super::{RepoError, RepoResult};
use shared::models::{Category, CategoryCreate, CategoryUpdate, CategoryWithItems, Item};
use sqlx::SqlitePool;
use std::collections::HashMap;

const COLUMNS: &str = "id, restaurant_id, name, created_at";

/// All categories of a restaurant, most recently created first
pub async fn find_all_for_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
) -> RepoResult<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(&format!(
        "SELECT {COLUMNS} FROM category WHERE restaurant_id = ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

/// All categories of a restaurant with their items fully materialized.
///
/// Two queries, grouped in memory — the explicit eager-fetch variant used by
/// the menu listing; callers that only need the rows use
/// [`find_all_for_restaurant`].
pub async fn find_all_with_items(
    pool: &SqlitePool,
    restaurant_id: i64,
) -> RepoResult<Vec<CategoryWithItems>> {
    let categories = find_all_for_restaurant(pool, restaurant_id).await?;

    let items = sqlx::query_as::<_, Item>(
        "SELECT i.id, i.category_id, i.name, i.description, i.price, i.image_path, i.created_at, i.updated_at
         FROM item i JOIN category c ON i.category_id = c.id
         WHERE c.restaurant_id = ?
         ORDER BY i.created_at DESC, i.id DESC",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;

    let mut by_category: HashMap<i64, Vec<Item>> = HashMap::new();
    for item in items {
        by_category.entry(item.category_id).or_default().push(item);
    }

    Ok(categories
        .into_iter()
        .map(|c| CategoryWithItems {
            items: by_category.remove(&c.id).unwrap_or_default(),
            id: c.id,
            name: c.name,
            created_at: c.created_at,
        })
        .collect())
}

/// One category with its items, scoped to a restaurant
pub async fn find_with_items(
    pool: &SqlitePool,
    id: i64,
    restaurant_id: i64,
) -> RepoResult<Option<CategoryWithItems>> {
    let Some(c) = find_by_id_scoped(pool, id, restaurant_id).await? else {
        return Ok(None);
    };

    let items = sqlx::query_as::<_, Item>(
        "SELECT id, category_id, name, description, price, image_path, created_at, updated_at
         FROM item WHERE category_id = ?
         ORDER BY created_at DESC, id DESC",
    )
    .bind(c.id)
    .fetch_all(pool)
    .await?;

    Ok(Some(CategoryWithItems {
        id: c.id,
        name: c.name,
        created_at: c.created_at,
        items,
    }))
}

/// Find a category by id within a restaurant; cross-tenant ids come back None
pub async fn find_by_id_scoped(
    pool: &SqlitePool,
    id: i64,
    restaurant_id: i64,
) -> RepoResult<Option<Category>> {
    let category = sqlx::query_as::<_, Category>(&format!(
        "SELECT {COLUMNS} FROM category WHERE id = ? AND restaurant_id = ?"
    ))
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?;
    Ok(category)
}

pub async fn find_by_name(
    pool: &SqlitePool,
    restaurant_id: i64,
    name: &str,
) -> RepoResult<Option<Category>> {
    let category = sqlx::query_as::<_, Category>(&format!(
        "SELECT {COLUMNS} FROM category WHERE restaurant_id = ? AND name = ? LIMIT 1"
    ))
    .bind(restaurant_id)
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(category)
}

pub async fn create(
    pool: &SqlitePool,
    restaurant_id: i64,
    data: CategoryCreate,
) -> RepoResult<Category> {
    // Check duplicate name (case-sensitive exact match)
    if find_by_name(pool, restaurant_id, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Category '{}' already exists",
            data.name
        )));
    }

    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO category (restaurant_id, name, created_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(restaurant_id)
    .bind(&data.name)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id_scoped(pool, id, restaurant_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    restaurant_id: i64,
    data: CategoryUpdate,
) -> RepoResult<Category> {
    let existing = find_by_id_scoped(pool, id, restaurant_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))?;

    // Check duplicate name if changing
    if let Some(ref new_name) = data.name
        && new_name != &existing.name
        && find_by_name(pool, restaurant_id, new_name).await?.is_some()
    {
        return Err(RepoError::Duplicate(format!(
            "Category '{}' already exists",
            new_name
        )));
    }

    sqlx::query("UPDATE category SET name = COALESCE(?1, name) WHERE id = ?2")
        .bind(&data.name)
        .bind(id)
        .execute(pool)
        .await?;

    find_by_id_scoped(pool, id, restaurant_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64, restaurant_id: i64) -> RepoResult<bool> {
    if find_by_id_scoped(pool, id, restaurant_id).await?.is_none() {
        return Err(RepoError::NotFound(format!("Category {id} not found")));
    }

    // Check if category has items
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM item WHERE category_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Err(RepoError::Validation(
            "Cannot delete category with items".into(),
        ));
    }

    sqlx::query("DELETE FROM category WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(true)
}
