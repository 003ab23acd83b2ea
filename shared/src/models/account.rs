//! Account Model

use serde::{Deserialize, Serialize};

/// Owner account entity
///
/// `password_hash` is an argon2 PHC string and never serialized to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: i64,
}
