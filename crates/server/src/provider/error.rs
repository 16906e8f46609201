//! Error types for image generation backends.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while a backend generates a preview.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned an error payload.
    #[error("API error ({error_type}): {message}")]
    Api { error_type: String, message: String },

    /// Rate limited by the backend.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// API key rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Failed to parse a response.
    #[error("parse error: {0}")]
    Parse(String),

    /// An input photo could not be fetched or decoded.
    #[error("input image unavailable: {0}")]
    Input(String),

    /// The backend answered but produced nothing usable.
    #[error("no image data in response")]
    Unavailable,

    /// The call did not finish within the configured timeout.
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        assert_eq!(
            ProviderError::RateLimited(60).to_string(),
            "rate limited, retry after 60 seconds"
        );
        assert_eq!(
            ProviderError::Timeout(Duration::from_secs(120)).to_string(),
            "generation timed out after 120s"
        );
        let err = ProviderError::Api {
            error_type: "INVALID_ARGUMENT".to_string(),
            message: "Unsupported MIME type".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error (INVALID_ARGUMENT): Unsupported MIME type"
        );
    }
}
