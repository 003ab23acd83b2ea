//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Dining table entity; `number` is what guests see on the QR card
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub restaurant_id: i64,
    pub number: i64,
    /// Stored QR code image path, if one was generated
    pub qr_code_path: Option<String>,
    pub created_at: i64,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub number: i64,
    pub qr_code_path: Option<String>,
}

/// Update dining table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    pub number: Option<i64>,
    pub qr_code_path: Option<String>,
}
