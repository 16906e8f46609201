//! Loading photo references into inline base64 payloads.
//!
//! Stored references are either hosted `http(s)` URLs or `data:` URLs.
//! Backends that want inline bytes get them through [`InlineImage::load`].

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

use super::error::ProviderError;

const DEFAULT_MIME: &str = "image/jpeg";

/// An image as a MIME type plus base64 payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    /// Resolve a stored reference.
    ///
    /// `data:` URLs are split in place, `http(s)` URLs are downloaded with
    /// `client`, and anything else is taken to be bare base64.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Input` if a remote image cannot be fetched.
    #[instrument(skip(client, reference), fields(kind = reference_kind(reference)))]
    pub async fn load(client: &reqwest::Client, reference: &str) -> Result<Self, ProviderError> {
        if let Some(inline) = Self::from_data_url(reference) {
            return Ok(inline);
        }

        if reference.starts_with("http://") || reference.starts_with("https://") {
            let response = client
                .get(reference)
                .send()
                .await
                .map_err(|e| ProviderError::Input(format!("failed to fetch image: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ProviderError::Input(format!(
                    "failed to fetch image: HTTP {status}"
                )));
            }

            let mime_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map_or_else(|| DEFAULT_MIME.to_string(), |v| mime_essence(v).to_string());
            let bytes = response
                .bytes()
                .await
                .map_err(|e| ProviderError::Input(format!("failed to read image: {e}")))?;

            debug!(bytes = bytes.len(), %mime_type, "Fetched remote image");
            return Ok(Self {
                mime_type,
                data: STANDARD.encode(&bytes),
            });
        }

        Ok(Self {
            mime_type: DEFAULT_MIME.to_string(),
            data: reference.to_string(),
        })
    }

    /// Split a `data:<mime>;base64,<payload>` URL. Returns `None` for other strings.
    #[must_use]
    pub fn from_data_url(reference: &str) -> Option<Self> {
        let rest = reference.strip_prefix("data:")?;
        let (header, data) = rest.split_once("base64,").unwrap_or(("", rest));
        let mime_type = header.trim_end_matches(';');
        let mime_type = if mime_type.is_empty() {
            DEFAULT_MIME
        } else {
            mime_type
        };

        Some(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    /// Re-encode as a `data:` URL.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

fn mime_essence(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or(content_type).trim()
}

fn reference_kind(reference: &str) -> &'static str {
    if reference.starts_with("data:") {
        "data-url"
    } else if reference.starts_with("http") {
        "remote"
    } else {
        "raw"
    }
}
