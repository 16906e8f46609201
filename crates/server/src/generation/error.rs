//! Failure taxonomy of the generation workflow.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::provider::ProviderError;
use crate::services::ledger::LedgerError;

/// Every way a generation request can end without a result.
///
/// All variants are terminal; nothing is retried.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Salon not found")]
    TenantNotFound,

    #[error("Salon is suspended")]
    TenantSuspended,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Image not found")]
    ImageNotFound,

    #[error("Image belongs to another salon")]
    ImageForbidden,

    #[error("Hair style not found")]
    StyleNotFound,

    #[error("{0}")]
    UnsupportedOperation(String),

    #[error(
        "You need {required} credits but only have {available}. Please purchase more credits."
    )]
    InsufficientCredits { required: i32, available: i32 },

    #[error("AI generation failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("failed to save generation: {0}")]
    Persistence(#[source] RepositoryError),

    /// A store lookup failed before any credits were touched.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Ledger(LedgerError),
}

impl GenerationError {
    /// Machine-readable kind for API responses.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::TenantNotFound | Self::ImageNotFound | Self::StyleNotFound => "NotFound",
            Self::TenantSuspended => "TenantSuspended",
            Self::MissingField(_) | Self::InvalidField { .. } => "ValidationError",
            Self::ImageForbidden | Self::UnsupportedOperation(_) => "Forbidden",
            Self::InsufficientCredits { .. } => "InsufficientCredits",
            Self::Provider(_) => "ProviderError",
            Self::Persistence(_) | Self::Repository(_) | Self::Ledger(_) => "PersistenceError",
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

impl From<LedgerError> for GenerationError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::TenantNotFound => Self::TenantNotFound,
            LedgerError::InsufficientCredits {
                required,
                available,
            } => Self::InsufficientCredits {
                required,
                available,
            },
            other => Self::Ledger(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_credits_message() {
        let err = GenerationError::InsufficientCredits {
            required: 2,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "You need 2 credits but only have 1. Please purchase more credits."
        );
        assert_eq!(err.kind(), "InsufficientCredits");
    }

    #[test]
    fn test_ledger_errors_map_into_taxonomy() {
        let err: GenerationError = LedgerError::InsufficientCredits {
            required: 1,
            available: 0,
        }
        .into();
        assert!(matches!(
            err,
            GenerationError::InsufficientCredits {
                required: 1,
                available: 0
            }
        ));

        let err: GenerationError = LedgerError::TenantNotFound.into();
        assert_eq!(err.kind(), "NotFound");
    }

    #[test]
    fn test_field_errors_are_validation_errors() {
        assert_eq!(
            GenerationError::MissingField("inputImageId").to_string(),
            "inputImageId is required"
        );
        assert_eq!(
            GenerationError::invalid("variations", "must be between 1 and 4").kind(),
            "ValidationError"
        );
    }
}
