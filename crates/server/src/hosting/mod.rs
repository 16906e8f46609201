//! Where uploaded photos live.
//!
//! With an `ImgBB` key, uploads are pushed to `ImgBB` and the public URL is
//! stored. Without one they are kept inline as base64 `data:` URLs.

mod imgbb;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::ImgBbConfig;

pub use imgbb::ImgBbClient;

/// Accepted upload content types.
pub const ALLOWED_CONTENT_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Errors from validating or storing an upload.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Invalid image type. Allowed types: JPEG, PNG, WebP")]
    InvalidType,

    #[error("File size exceeds maximum limit of 10MB")]
    TooLarge,

    #[error("No image provided")]
    Empty,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upload rejected: {0}")]
    Rejected(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl HostError {
    /// Whether the error is the caller's fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidType | Self::TooLarge | Self::Empty)
    }
}

/// An upload as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Check the content type and size.
    ///
    /// # Errors
    ///
    /// Returns `InvalidType`, `TooLarge` or `Empty`.
    pub fn validate(&self) -> Result<(), HostError> {
        if self.bytes.is_empty() {
            return Err(HostError::Empty);
        }
        if !ALLOWED_CONTENT_TYPES.contains(&self.content_type.as_str()) {
            return Err(HostError::InvalidType);
        }
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(HostError::TooLarge);
        }
        Ok(())
    }

    fn base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// The configured image host.
#[derive(Clone)]
pub enum ImageHost {
    ImgBb(ImgBbClient),
    Inline,
}

impl ImageHost {
    /// `ImgBB` when a key is configured, inline otherwise.
    #[must_use]
    pub fn select(config: Option<&ImgBbConfig>) -> Self {
        config.map_or_else(
            || {
                info!("No IMGBB_API_KEY set, storing uploads inline");
                Self::Inline
            },
            |config| Self::ImgBb(ImgBbClient::new(config)),
        )
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ImgBb(_) => "imgbb",
            Self::Inline => "inline",
        }
    }

    /// Validate and store an upload, returning the reference to persist.
    ///
    /// # Errors
    ///
    /// Returns a validation error, or the host's error if storing fails.
    #[instrument(skip(self, upload), fields(host = self.name(), bytes = upload.bytes.len()))]
    pub async fn store(&self, upload: &Upload) -> Result<String, HostError> {
        upload.validate()?;
        match self {
            Self::ImgBb(client) => client.upload(&upload.base64()).await,
            Self::Inline => Ok(format!(
                "data:{};base64,{}",
                upload.content_type,
                upload.base64()
            )),
        }
    }
}
