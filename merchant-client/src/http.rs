// merchant-client/src/http.rs
// HTTP 客户端 - 网络通信

use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::{Client, RequestBuilder, StatusCode, multipart};
use serde::de::DeserializeOwned;
use shared::ApiResponse;

/// HTTP client for the merchant REST API
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl NetworkHttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout_duration())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// 获取基础 URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(t) => req.header(reqwest::header::AUTHORIZATION, format!("Bearer {}", t)),
            None => req,
        }
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let req = self.authorize(self.client.get(self.url(path)));
        let response = req.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let req = self.authorize(self.client.post(self.url(path)).json(body));
        let response = req.send().await?;
        Self::handle_response(response).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let req = self.authorize(self.client.put(self.url(path)).json(body));
        let response = req.send().await?;
        Self::handle_response(response).await
    }

    /// Make a DELETE request with JSON body; any 2xx counts as success
    pub async fn delete_with_body<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<()> {
        let req = self.authorize(self.client.delete(self.url(path)).json(body));
        let response = req.send().await?;
        Self::expect_success(response).await
    }

    /// POST a single file as `multipart/form-data`
    pub async fn post_file<T: DeserializeOwned>(
        &self,
        path: &str,
        field: &str,
        file_name: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> ClientResult<T> {
        let part = multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(mime_type)?;
        let form = multipart::Form::new().part(field.to_string(), part);

        let req = self.authorize(self.client.post(self.url(path)).multipart(form));
        let response = req.send().await?;
        Self::handle_response(response).await
    }

    /// Decode a JSON body, unwrapping the `ApiResponse` envelope when present
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let text = response.text().await?;
        Self::decode(status, &text)
    }

    fn decode<T: DeserializeOwned>(status: StatusCode, text: &str) -> ClientResult<T> {
        if !status.is_success() {
            return Err(Self::error_from_body(status, text));
        }

        if let Ok(envelope) = serde_json::from_str::<ApiResponse<T>>(text) {
            if !envelope.is_success() {
                return Err(ClientError::Api {
                    code: envelope.error_code(),
                    status: status.as_u16(),
                    message: envelope.error_message(),
                });
            }
            if let Some(data) = envelope.data {
                return Ok(data);
            }
        }
        serde_json::from_str::<T>(text).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn expect_success(response: reqwest::Response) -> ClientResult<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(Self::error_from_body(status, &text))
    }

    fn error_from_body(status: StatusCode, text: &str) -> ClientError {
        // 尝试解析为 API 错误响应
        if let Ok(envelope) = serde_json::from_str::<ApiResponse<serde_json::Value>>(text)
            && (!envelope.message.trim().is_empty() || envelope.error_code().is_some())
        {
            return ClientError::Api {
                code: envelope.error_code(),
                status: status.as_u16(),
                message: envelope.error_message(),
            };
        }
        // 降级到状态码处理
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::NOT_FOUND => ClientError::NotFound(text.to_string()),
            _ => ClientError::Api {
                code: None,
                status: status.as_u16(),
                message: if text.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    text.trim().to_string()
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;

    #[test]
    fn test_base_url_is_trimmed() {
        let client = NetworkHttpClient::new(&ClientConfig::new("http://shop.local/")).unwrap();
        assert_eq!(client.base_url(), "http://shop.local");
        assert_eq!(client.url("/api/images"), "http://shop.local/api/images");
        assert_eq!(client.url("api/products/1"), "http://shop.local/api/products/1");
    }

    #[test]
    fn test_token_from_config() {
        let client =
            NetworkHttpClient::new(&ClientConfig::new("http://x").with_token("t0k")).unwrap();
        assert_eq!(client.token(), Some("t0k"));
    }

    #[test]
    fn test_error_from_envelope() {
        let body = r#"{"code":6501,"message":"File is too large"}"#;
        match NetworkHttpClient::error_from_body(StatusCode::BAD_REQUEST, body) {
            ClientError::Api { code, status, message } => {
                assert_eq!(code, Some(ErrorCode::FileTooLarge));
                assert_eq!(status, 400);
                assert_eq!(message, "File is too large");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_fallbacks() {
        assert!(matches!(
            NetworkHttpClient::error_from_body(StatusCode::UNAUTHORIZED, ""),
            ClientError::Unauthorized
        ));
        match NetworkHttpClient::error_from_body(StatusCode::BAD_GATEWAY, "") {
            ClientError::Api { message, .. } => assert_eq!(message, "HTTP 502 Bad Gateway"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[derive(Debug, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Uploaded {
        image_url: String,
    }

    #[test]
    fn test_decode_bare_and_wrapped() {
        let bare: Uploaded =
            NetworkHttpClient::decode(StatusCode::OK, r#"{"imageUrl":"https://cdn/a.png"}"#)
                .unwrap();
        assert_eq!(bare.image_url, "https://cdn/a.png");

        let wrapped: Uploaded = NetworkHttpClient::decode(
            StatusCode::OK,
            r#"{"code":0,"message":"OK","data":{"imageUrl":"https://cdn/b.png"}}"#,
        )
        .unwrap();
        assert_eq!(wrapped.image_url, "https://cdn/b.png");
    }

    #[test]
    fn test_decode_failed_envelope_with_blank_message() {
        let err = NetworkHttpClient::decode::<Uploaded>(
            StatusCode::OK,
            r#"{"code":6509,"message":""}"#,
        )
        .unwrap_err();
        match err {
            ClientError::Api { code, status, message } => {
                assert_eq!(code, Some(ErrorCode::FileStorageFailed));
                assert_eq!(status, 200);
                assert_eq!(message, "File storage failed");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = NetworkHttpClient::decode::<Uploaded>(StatusCode::OK, r#"{"code":4242}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Request failed (code 4242)");
    }

    #[test]
    fn test_error_body_with_code_only() {
        let body = r#"{"code":6501}"#;
        match NetworkHttpClient::error_from_body(StatusCode::PAYLOAD_TOO_LARGE, body) {
            ClientError::Api { message, .. } => assert_eq!(message, "File is too large"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
