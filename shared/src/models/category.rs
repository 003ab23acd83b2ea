//! Category Model

use serde::{Deserialize, Serialize};

use super::Item;

/// Menu category, scoped to one restaurant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub created_at: i64,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
}

/// Update category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
}

/// Category with its items fully materialized (menu listing)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWithItems {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
    pub items: Vec<Item>,
}
