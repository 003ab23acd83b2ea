//! Access scoping helpers
//!
//! Every authenticated handler resolves the caller's restaurant here first;
//! all repository calls downstream are scoped by that restaurant id. List
//! endpoints tolerate a missing restaurant (empty collection); mutations do
//! not.

use shared::models::Restaurant;
use sqlx::SqlitePool;

use crate::auth::CurrentUser;
use crate::db::repository::restaurant;
use crate::utils::AppError;

/// The caller's restaurant, or a 422 when none exists yet
pub async fn require_restaurant(
    pool: &SqlitePool,
    user: &CurrentUser,
) -> Result<Restaurant, AppError> {
    optional_restaurant(pool, user)
        .await?
        .ok_or_else(|| AppError::business_rule("Please create a restaurant first"))
}

/// The caller's restaurant, if any — for list endpoints that return empty
/// collections instead of failing
pub async fn optional_restaurant(
    pool: &SqlitePool,
    user: &CurrentUser,
) -> Result<Option<Restaurant>, AppError> {
    Ok(restaurant::find_by_account(pool, user.id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::account;
    use crate::db::test_pool;
    use shared::models::RestaurantCreate;

    fn user(id: i64) -> CurrentUser {
        CurrentUser {
            id,
            name: "Owner".into(),
            email: "owner@example.com".into(),
        }
    }

    #[tokio::test]
    async fn test_caller_without_restaurant() {
        let pool = test_pool().await;
        let a = account::create(&pool, "Owner", "owner@example.com", "hash").await.unwrap();

        assert!(optional_restaurant(&pool, &user(a.id)).await.unwrap().is_none());
        let err = require_restaurant(&pool, &user(a.id)).await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn test_caller_with_restaurant() {
        let pool = test_pool().await;
        let a = account::create(&pool, "Owner", "owner@example.com", "hash").await.unwrap();
        restaurant::create(
            &pool,
            a.id,
            RestaurantCreate {
                name: "Trattoria".into(),
                address: "Via Roma 1".into(),
            },
            None,
        )
        .await
        .unwrap();

        let r = require_restaurant(&pool, &user(a.id)).await.unwrap();
        assert_eq!(r.account_id, a.id);
    }
}
