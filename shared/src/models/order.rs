//! Order Models
//!
//! Live orders plus their archived (history) counterparts. A live order is
//! deleted the moment it completes; the history tables are append-only.

use serde::{Deserialize, Serialize};

// =============================================================================
// Order (live)
// =============================================================================

/// Order status state machine: pending → preparing → ready → completed.
///
/// `completed` is terminal: reaching it archives the order and removes the
/// live row, so a completed order is never observable in the live table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
        }
    }

    /// Parse a wire value; returns None for anything outside the four
    /// legal states.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OrderStatus::Pending),
            "preparing" => Some(OrderStatus::Preparing),
            "ready" => Some(OrderStatus::Ready),
            "completed" => Some(OrderStatus::Completed),
            _ => None,
        }
    }
}

/// Live order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub restaurant_id: i64,
    /// Table number as printed on the QR card; not a foreign key
    pub table_number: i64,
    pub status: OrderStatus,
    pub created_at: i64,
}

// =============================================================================
// API Request Types
// =============================================================================

/// One cart line of a submitted order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineInput {
    pub item_id: i64,
    pub quantity: i64,
    pub special_note: Option<String>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub table_number: i64,
    pub items: Vec<OrderLineInput>,
}

/// Status transition payload; the raw string is validated server-side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: String,
}

// =============================================================================
// API Response Types
// =============================================================================

/// Order line with its referenced item attached
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLineDetail {
    pub id: i64,
    pub item_id: i64,
    pub item_name: String,
    pub price: f64,
    pub quantity: i64,
    pub special_note: Option<String>,
}

/// Full order with lines (list and detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: i64,
    pub table_number: i64,
    pub status: OrderStatus,
    pub created_at: i64,
    pub items: Vec<OrderLineDetail>,
}

// =============================================================================
// Order History (archive)
// =============================================================================

/// Archived order entity; independent primary key from the live order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderHistory {
    pub id: i64,
    pub restaurant_id: i64,
    pub table_number: i64,
    /// created_at of the live order that was archived
    pub ordered_at: i64,
    pub completed_at: i64,
}

/// Archived order line with item and category names for reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderHistoryLine {
    pub item_id: i64,
    pub item_name: String,
    pub category_name: Option<String>,
    pub quantity: i64,
    pub special_note: Option<String>,
}

/// Archived order with its lines (history listing)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderHistoryDetail {
    pub id: i64,
    pub table_number: i64,
    pub ordered_at: i64,
    pub completed_at: i64,
    pub items: Vec<OrderHistoryLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_round_trip() {
        for s in ["pending", "preparing", "ready", "completed"] {
            assert_eq!(OrderStatus::parse(s).unwrap().as_str(), s);
        }
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert!(OrderStatus::parse("PENDING").is_none());
        assert!(OrderStatus::parse("cancelled").is_none());
        assert!(OrderStatus::parse("").is_none());
    }
}
