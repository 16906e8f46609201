//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//!
//! Every error body has the shape `{"error": <kind>, "message": <text>}`.
//! Insufficient-credit responses also carry `required` and `available`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::generation::GenerationError;
use crate::hosting::HostError;
use crate::services::auth::AuthError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Generation workflow failed.
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Image validation or hosting failed.
    #[error("Upload error: {0}")]
    Host(#[from] HostError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User may not touch this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The salon is suspended.
    #[error("Salon is suspended")]
    TenantSuspended,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

const INTERNAL_MESSAGE: &str = "Internal server error";

impl AppError {
    /// Status code, machine-readable kind and client-facing message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => (StatusCode::NOT_FOUND, "NotFound", "Not found".into()),
                RepositoryError::Conflict(msg) => {
                    (StatusCode::BAD_REQUEST, "ValidationError", msg.clone())
                }
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PersistenceError",
                    INTERNAL_MESSAGE.into(),
                ),
            },
            Self::Generation(err) => generation_parts(err),
            Self::Auth(err) => auth_parts(err),
            Self::Host(err) if err.is_client_error() => {
                (StatusCode::BAD_REQUEST, "ValidationError", err.to_string())
            }
            Self::Host(_) => (
                StatusCode::BAD_GATEWAY,
                "UpstreamError",
                "Failed to store image".into(),
            ),
            Self::NotFound(what) => (StatusCode::NOT_FOUND, "NotFound", format!("{what} not found")),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "Unauthorized", msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden", msg.clone()),
            Self::TenantSuspended => (
                StatusCode::FORBIDDEN,
                "TenantSuspended",
                "Salon is suspended".into(),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "ValidationError", msg.clone()),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalError",
                INTERNAL_MESSAGE.into(),
            ),
        }
    }
}

fn generation_parts(err: &GenerationError) -> (StatusCode, &'static str, String) {
    let status = match err {
        GenerationError::Unauthorized => StatusCode::UNAUTHORIZED,
        GenerationError::TenantNotFound
        | GenerationError::ImageNotFound
        | GenerationError::StyleNotFound => StatusCode::NOT_FOUND,
        GenerationError::TenantSuspended
        | GenerationError::ImageForbidden
        | GenerationError::UnsupportedOperation(_) => StatusCode::FORBIDDEN,
        GenerationError::MissingField(_) | GenerationError::InvalidField { .. } => {
            StatusCode::BAD_REQUEST
        }
        GenerationError::InsufficientCredits { .. } => StatusCode::PAYMENT_REQUIRED,
        GenerationError::Provider(_)
        | GenerationError::Persistence(_)
        | GenerationError::Repository(_)
        | GenerationError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = match err {
        GenerationError::Provider(_) => "Failed to generate image".to_string(),
        GenerationError::Persistence(_)
        | GenerationError::Repository(_)
        | GenerationError::Ledger(_) => INTERNAL_MESSAGE.to_string(),
        other => other.to_string(),
    };

    (status, err.kind(), message)
}

fn auth_parts(err: &AuthError) -> (StatusCode, &'static str, String) {
    match err {
        AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "Invalid email or password".into(),
        ),
        AuthError::AdminSignupRefused => (StatusCode::FORBIDDEN, "Forbidden", err.to_string()),
        AuthError::UserNotFound | AuthError::SalonNotFound => {
            (StatusCode::NOT_FOUND, "NotFound", err.to_string())
        }
        AuthError::Repository(_) | AuthError::PasswordHash => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "InternalError",
            INTERNAL_MESSAGE.into(),
        ),
        AuthError::InvalidEmail(_) => (
            StatusCode::BAD_REQUEST,
            "ValidationError",
            "Invalid email address".into(),
        ),
        _ => (StatusCode::BAD_REQUEST, "ValidationError", err.to_string()),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = self.parts();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = match &self {
            Self::Generation(GenerationError::InsufficientCredits {
                required,
                available,
            }) => json!({
                "error": kind,
                "message": message,
                "required": required,
                "available": available,
            }),
            _ => json!({ "error": kind, "message": message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn get_body(err: AppError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Salon".to_string());
        assert_eq!(err.to_string(), "Not found: Salon");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_generation_status_codes() {
        assert_eq!(
            get_status(GenerationError::Unauthorized.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(GenerationError::MissingField("inputImageId").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(GenerationError::ImageForbidden.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(GenerationError::TenantSuspended.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(GenerationError::StyleNotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(
                GenerationError::InsufficientCredits {
                    required: 1,
                    available: 0
                }
                .into()
            ),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            get_status(GenerationError::Provider(ProviderError::Unavailable).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_insufficient_credits_body() {
        let body = get_body(
            GenerationError::InsufficientCredits {
                required: 1,
                available: 0,
            }
            .into(),
        )
        .await;

        assert_eq!(body["error"], "InsufficientCredits");
        assert_eq!(body["required"], 1);
        assert_eq!(body["available"], 0);
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let body = get_body(AppError::Internal("connection refused on 10.0.0.3".to_string())).await;
        assert_eq!(body["message"], "Internal server error");

        let timeout = ProviderError::Timeout(std::time::Duration::from_secs(120));
        let body = get_body(GenerationError::Provider(timeout).into()).await;
        assert_eq!(body["error"], "ProviderError");
        assert_eq!(body["message"], "Failed to generate image");
    }

    #[test]
    fn test_auth_status_codes() {
        assert_eq!(
            get_status(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AuthError::UserAlreadyExists.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AuthError::AdminSignupRefused.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(HostError::TooLarge.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(RepositoryError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
    }
}
