//! Remote image store

use async_trait::async_trait;
use shared::models::{ImageDeleteRequest, ImageUploadResponse};
use thiserror::Error;

use super::file::ImageFile;
use crate::http::NetworkHttpClient;
use crate::{ClientConfig, ClientError, ClientResult};

/// Upload endpoint
pub const IMAGE_UPLOAD_PATH: &str = "api/images";
/// Delete endpoint (JSON body `{ "imageUrl": ... }`)
pub const IMAGE_DELETE_PATH: &str = "api/images";
/// Multipart field carrying the file
pub const IMAGE_FIELD: &str = "image";

/// Failure of one file's upload
#[derive(Debug, Error)]
pub enum UploadError {
    /// Server or transport failure, carrying the server message when one was sent
    #[error("{0}")]
    Client(#[from] ClientError),

    /// Server answered 2xx without a usable image URL
    #[error("Upload response did not contain an image URL")]
    MissingUrl,

    /// The upload task ended without producing a result
    #[error("Upload task failed: {0}")]
    Task(String),
}

impl UploadError {
    /// Message suitable for a toast
    pub fn user_message(&self) -> String {
        match self {
            UploadError::Client(ClientError::Api { message, .. }) if !message.trim().is_empty() => {
                message.trim().to_string()
            }
            UploadError::Client(e) if e.is_timeout() => "Request timed out".to_string(),
            UploadError::Client(ClientError::Http(_)) => "Network error".to_string(),
            _ => "Upload failed".to_string(),
        }
    }
}

/// Accepts image uploads and deletions
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload one file, returning its permanent URL
    async fn upload(&self, file: &ImageFile) -> Result<String, UploadError>;

    /// Delete a previously issued URL
    async fn delete(&self, image_url: &str) -> ClientResult<()>;
}

/// [`ImageStore`] backed by the merchant REST API
#[derive(Debug, Clone)]
pub struct HttpImageStore {
    http: NetworkHttpClient,
}

impl HttpImageStore {
    pub fn new(http: NetworkHttpClient) -> Self {
        Self { http }
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self::new(NetworkHttpClient::new(config)?))
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn upload(&self, file: &ImageFile) -> Result<String, UploadError> {
        let resp: ImageUploadResponse = self
            .http
            .post_file(
                IMAGE_UPLOAD_PATH,
                IMAGE_FIELD,
                file.name(),
                file.mime_type(),
                file.data().to_vec(),
            )
            .await?;

        if resp.image_url.trim().is_empty() {
            return Err(UploadError::MissingUrl);
        }
        Ok(resp.image_url)
    }

    async fn delete(&self, image_url: &str) -> ClientResult<()> {
        let body = ImageDeleteRequest {
            image_url: image_url.to_string(),
        };
        self.http.delete_with_body(IMAGE_DELETE_PATH, &body).await
    }
}
