//! API response envelope

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Unified API response structure
///
/// Consistent response format of the merchant API:
/// - `code`: Error code (0 for success)
/// - `message`: Human-readable message
/// - `data`: Response payload (on success)
/// - `details`: Additional error details (on failure)
///
/// Every field may be missing, so bare bodies still parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Error code (0 for success, non-zero for errors)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Response data (present on success); a missing field reads as `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Additional error details (present on failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            code: Some(0),
            message: "OK".to_string(),
            data: Some(data),
            details: None,
        }
    }

    /// Whether the envelope reports success (missing code counts as success)
    pub fn is_success(&self) -> bool {
        self.code.is_none_or(|c| c == 0)
    }

    /// Typed error code, if the server sent a known one
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.code.and_then(|c| ErrorCode::try_from(c).ok())
    }

    /// Server message, or the default text of the error code when blank
    pub fn error_message(&self) -> String {
        let message = self.message.trim();
        if !message.is_empty() {
            return message.to_string();
        }
        match (self.error_code(), self.code) {
            (Some(code), _) => code.message().to_string(),
            (None, Some(code)) => format!("Request failed (code {})", code),
            (None, None) => "Request failed".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    /// Payload without a `Default` impl
    #[derive(Debug, PartialEq, Deserialize)]
    struct Upload {
        url: String,
    }

    fn parse<T: DeserializeOwned>(json: &str) -> ApiResponse<T> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_api_response_success() {
        let response = ApiResponse::success(42);
        assert_eq!(response.code, Some(0));
        assert!(response.is_success());
        assert_eq!(response.data, Some(42));
    }

    #[test]
    fn test_deserialize_any_payload() {
        let response: ApiResponse<Upload> =
            parse(r#"{"code":0,"message":"OK","data":{"url":"https://cdn/a.png"}}"#);
        assert_eq!(
            response.data,
            Some(Upload {
                url: "https://cdn/a.png".into()
            })
        );

        let error: ApiResponse<Upload> = parse(r#"{"code":6501,"message":"too big"}"#);
        assert!(error.data.is_none());
        assert!(!error.is_success());
        assert_eq!(error.error_code(), Some(ErrorCode::FileTooLarge));
    }

    #[test]
    fn test_api_response_deserialize_minimal() {
        let response: ApiResponse<i32> = parse(r#"{"data":7}"#);
        assert!(response.is_success());
        assert_eq!(response.data, Some(7));
        assert_eq!(response.message, "");
    }

    #[test]
    fn test_error_message_fallbacks() {
        let known: ApiResponse<()> = parse(r#"{"code":6509,"message":"  "}"#);
        assert_eq!(known.error_message(), "File storage failed");

        let unknown: ApiResponse<()> = parse(r#"{"code":4242}"#);
        assert_eq!(unknown.error_message(), "Request failed (code 4242)");

        let given: ApiResponse<()> = parse(r#"{"code":6501,"message":"Max 5MB"}"#);
        assert_eq!(given.error_message(), "Max 5MB");
    }

    #[test]
    fn test_api_response_serialize() {
        let response = ApiResponse::success("hello");
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"code\":0"));
        assert!(json.contains("\"data\":\"hello\""));
        assert!(!json.contains("details"));
    }
}
