//! Order Lifecycle
//!
//! Placement, status transitions and completion archival. Completion is the
//! only terminal transition: it copies the order into the history tables,
//! bumps the sales counters and removes the live row — all in one database
//! transaction, within the request that asked for it.

pub mod lifecycle;

pub use lifecycle::{OrderError, TransitionOutcome};
