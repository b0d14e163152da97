//! Data models
//!
//! Shared between the merchant backend and its clients (via API).
//! Wire format is camelCase JSON.

pub mod product;
pub mod product_image;

// Re-exports
pub use product::*;
pub use product_image::*;
