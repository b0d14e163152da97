//! Merchant Client - product image uploads for the merchant dashboard
//!
//! Validates picked images, uploads them concurrently to the merchant API,
//! keeps an ordered preview list consistent while uploads and removals
//! interleave, and feeds the committed URLs into the product form.

pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod image;
pub mod logger;

pub use config::{ClientConfig, UploadRules};
pub use error::{ClientError, ClientResult};
pub use form::{ProductApi, ProductImageForm};
pub use http::NetworkHttpClient;
pub use image::{ImageFile, ImageUploader};

// Re-export shared types for convenience
pub use shared::models::{Product, ProductCreate, ProductImage, ProductUpdate};
pub use shared::{Notification, NotificationLevel};
