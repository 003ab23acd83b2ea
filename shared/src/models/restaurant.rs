//! Restaurant Model

use serde::{Deserialize, Serialize};

/// Restaurant entity — the tenant boundary; exactly one per owner account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Restaurant {
    pub id: i64,
    pub account_id: i64,
    pub name: String,
    pub address: String,
    /// Stored profile image path, e.g. "profiles/<uuid>.jpg"
    pub profile_image: Option<String>,
    pub created_at: i64,
}

/// Create restaurant payload (text fields of the multipart form)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantCreate {
    pub name: String,
    pub address: String,
}

/// Update restaurant payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
}
