//! Error codes and the API response envelope
//!
//! - [`ErrorCode`]: numeric codes returned by the merchant API
//! - [`ApiResponse`]: unified response format
//!
//! # Example
//!
//! ```
//! use shared::error::{ApiResponse, ErrorCode};
//!
//! let response: ApiResponse<()> =
//!     serde_json::from_str(r#"{"code":6501,"message":""}"#).unwrap();
//! assert_eq!(response.error_code(), Some(ErrorCode::FileTooLarge));
//! assert_eq!(response.error_message(), "File is too large");
//! ```

mod codes;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::ApiResponse;
