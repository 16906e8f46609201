//! Authentication error types.

use thiserror::Error;

use style_preview_core::{EmailError, SlugError};

use crate::db::RepositoryError;

/// Errors that can occur during authentication and account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required field was missing or blank.
    #[error("Missing required fields")]
    MissingFields,

    /// Invalid email format.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Role was neither `admin` nor `salon`.
    #[error("Invalid role")]
    InvalidRole,

    /// Admin accounts are provisioned out of band.
    #[error("Admin accounts cannot be created through signup")]
    AdminSignupRefused,

    /// A salon field required for salon users was missing.
    #[error("{0} is required for salon users")]
    MissingSalonField(&'static str),

    /// Invalid salon slug.
    #[error("Invalid salon slug: {0}")]
    InvalidSlug(#[from] SlugError),

    /// Invalid salon type or services value.
    #[error("{0}")]
    InvalidSalonField(String),

    /// Invalid credentials (wrong password or user not found).
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Current password did not match on a password change.
    #[error("Invalid current password")]
    InvalidCurrentPassword,

    /// User not found.
    #[error("User not found")]
    UserNotFound,

    /// Salon a new operator should be bound to does not exist.
    #[error("Salon not found")]
    SalonNotFound,

    /// User already exists.
    #[error("User with this email already exists")]
    UserAlreadyExists,

    /// Salon slug already in use.
    #[error(
        "A salon with this slug already exists. If this is your salon, please login instead of signing up."
    )]
    SlugTaken,

    /// Password too weak or invalid.
    #[error("{0}")]
    WeakPassword(String),

    /// A uniqueness constraint fired after the pre-checks passed.
    #[error("{0}")]
    Conflict(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
