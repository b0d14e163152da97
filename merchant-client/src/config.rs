//! Client configuration

use std::time::Duration;

/// Default maximum image size (5MB)
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// MIME types accepted by the image store
pub const SUPPORTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Per-file rules applied before any upload is attempted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRules {
    /// Largest accepted file, inclusive
    pub max_file_bytes: u64,

    /// Accepted MIME types (lowercase, `type/subtype`)
    pub allowed_mime_types: Vec<String>,

    /// Delete server copies of uploads whose slot was removed mid-flight
    pub cleanup_orphans: bool,
}

impl Default for UploadRules {
    fn default() -> Self {
        Self {
            max_file_bytes: MAX_IMAGE_BYTES,
            allowed_mime_types: SUPPORTED_IMAGE_TYPES.iter().map(|s| s.to_string()).collect(),
            cleanup_orphans: true,
        }
    }
}

impl UploadRules {
    /// Create new upload rules with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max file size
    pub fn with_max_file_bytes(mut self, bytes: u64) -> Self {
        self.max_file_bytes = bytes;
        self
    }

    /// Replace the accepted MIME types
    pub fn with_allowed_mime_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_mime_types = types
            .into_iter()
            .map(|t| t.into().to_ascii_lowercase())
            .collect();
        self
    }

    /// Keep orphaned uploads on the server
    pub fn keep_orphans(mut self) -> Self {
        self.cleanup_orphans = false;
        self
    }
}

/// Client configuration for connecting to the merchant API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// Bearer token for authentication
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Image validation rules
    pub upload_rules: UploadRules,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: 30,
            upload_rules: UploadRules::default(),
        }
    }

    /// Load configuration from the environment (a `.env` file is read first if present)
    ///
    /// - `MERCHANT_API_URL` (default `http://localhost:8080`)
    /// - `MERCHANT_API_TOKEN`
    /// - `MERCHANT_HTTP_TIMEOUT` seconds (default 30)
    /// - `MERCHANT_MAX_IMAGE_BYTES` (default 5MB)
    pub fn from_env() -> Self {
        let _ = dotenv::dotenv();

        let mut config = Self::new(
            std::env::var("MERCHANT_API_URL").unwrap_or_else(|_| "http://localhost:8080".into()),
        );
        config.token = std::env::var("MERCHANT_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());
        config.timeout = std::env::var("MERCHANT_HTTP_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        config.upload_rules.max_file_bytes = std::env::var("MERCHANT_MAX_IMAGE_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(MAX_IMAGE_BYTES);
        config
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set image validation rules
    pub fn with_upload_rules(mut self, rules: UploadRules) -> Self {
        self.upload_rules = rules;
        self
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
