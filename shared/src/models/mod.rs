//! Data models
//!
//! Shared between comanda-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), all timestamps are
//! Unix milliseconds.

pub mod account;
pub mod category;
pub mod dining_table;
pub mod item;
pub mod order;
pub mod restaurant;
pub mod statistic;

// Re-exports
pub use account::*;
pub use category::*;
pub use dining_table::*;
pub use item::*;
pub use order::*;
pub use restaurant::*;
pub use statistic::*;
