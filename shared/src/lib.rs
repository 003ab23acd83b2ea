//! Shared types for the Comanda ordering platform
//!
//! Data models and API DTOs used by the server and its clients.
//! DB row types derive `sqlx::FromRow` behind the `db` feature so that
//! client builds stay free of database dependencies.

pub mod client;
pub mod models;
pub mod util;

pub use models::*;
