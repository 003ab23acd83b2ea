//! Item Model

use serde::{Deserialize, Serialize};

/// Menu item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Item {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    /// Stored image path, e.g. "items/<uuid>.jpg"
    pub image_path: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Item with its category name attached (item listing)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ItemWithCategory {
    pub id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_path: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create item payload (text fields of the multipart form)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCreate {
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

/// Update item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub category_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}
