//! 服务模块

pub mod images;

pub use images::{ImageKind, ImageStore};
