//! Shared types for the merchant dashboard
//!
//! Common types used by the backend API and its clients: error codes,
//! the response envelope, product models and user notifications.

pub mod error;
pub mod models;
pub mod notification;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, ErrorCode};
pub use notification::{Notification, NotificationLevel};
