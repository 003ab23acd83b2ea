//! Account Repository

use super::{RepoError, RepoResult};
use shared::models::Account;
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        "SELECT id, name, email, password_hash, created_at FROM account WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(account)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        "SELECT id, name, email, password_hash, created_at FROM account WHERE email = ? LIMIT 1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(account)
}

pub async fn create(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> RepoResult<Account> {
    // Check duplicate email
    if find_by_email(pool, email).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Account with email '{}' already exists",
            email
        )));
    }

    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO account (name, email, password_hash, created_at) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create account".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = test_pool().await;
        let a = create(&pool, "Alice", "alice@example.com", "hash").await.unwrap();
        assert_eq!(a.name, "Alice");

        let found = find_by_email(&pool, "alice@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, a.id);
        assert!(find_by_email(&pool, "bob@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let pool = test_pool().await;
        create(&pool, "Alice", "alice@example.com", "hash").await.unwrap();
        let err = create(&pool, "Other", "alice@example.com", "hash2").await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }
}
