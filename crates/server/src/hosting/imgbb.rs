//! `ImgBB` upload API client.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::ImgBbConfig;

use super::HostError;

const IMGBB_UPLOAD_URL: &str = "https://api.imgbb.com/1/upload";

/// `ImgBB` client.
#[derive(Clone)]
pub struct ImgBbClient {
    inner: Arc<ImgBbClientInner>,
}

struct ImgBbClientInner {
    client: reqwest::Client,
    api_key: SecretString,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: Option<UploadData>,
    #[serde(default)]
    error: Option<UploadError>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct UploadError {
    message: String,
}

impl ImgBbClient {
    #[must_use]
    pub fn new(config: &ImgBbConfig) -> Self {
        Self {
            inner: Arc::new(ImgBbClientInner {
                client: reqwest::Client::new(),
                api_key: config.api_key.clone(),
            }),
        }
    }

    /// Upload base64 image data and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or `ImgBB` rejects the upload.
    #[instrument(skip(self, image_base64))]
    pub async fn upload(&self, image_base64: &str) -> Result<String, HostError> {
        let form = [
            ("key", self.inner.api_key.expose_secret()),
            ("image", image_base64),
        ];

        let response = self
            .inner
            .client
            .post(IMGBB_UPLOAD_URL)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed = parse_upload_response(&body);

        if !status.is_success() {
            let message = parsed
                .ok()
                .and_then(|r| r.error)
                .map_or_else(|| format!("HTTP {status}"), |e| e.message);
            return Err(HostError::Rejected(message));
        }

        let url = parsed?
            .data
            .map(|data| data.url)
            .ok_or_else(|| HostError::Parse("missing data.url".to_string()))?;

        debug!(%url, "Uploaded image to ImgBB");
        Ok(url)
    }
}

fn parse_upload_response(body: &str) -> Result<UploadResponse, HostError> {
    serde_json::from_str(body)
        .map_err(|e| HostError::Parse(format!("Failed to parse ImgBB response: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success() {
        let body = r#"{"data":{"id":"2ndCYJK","url":"https://i.ibb.co/w04Prt6/c1f64245afb2.gif"},"success":true,"status":200}"#;
        let parsed = parse_upload_response(body).unwrap();
        assert_eq!(
            parsed.data.unwrap().url,
            "https://i.ibb.co/w04Prt6/c1f64245afb2.gif"
        );
    }

    #[test]
    fn test_parse_error() {
        let body = r#"{"status_code":400,"error":{"message":"Invalid API v1 key.","code":100},"status_txt":"Bad Request"}"#;
        let parsed = parse_upload_response(body).unwrap();
        assert!(parsed.data.is_none());
        assert_eq!(parsed.error.unwrap().message, "Invalid API v1 key.");
    }
}
