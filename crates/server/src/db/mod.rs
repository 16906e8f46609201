//! `PostgreSQL` repositories.
//!
//! ## Tables
//!
//! - `tenants` - Salons, their status, category and credit balance
//! - `style_entries` - Per-salon style library photos
//! - `users` - Admin and salon operator accounts
//! - `images` - Uploaded client photos
//! - `generations` - Append-only generation history
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p style-preview-cli -- migrate
//! ```
//!
//! Queries are built at runtime (`sqlx::query_as` + `FromRow`) so the crate
//! compiles without a live database or an offline query cache.

pub mod generations;
pub mod images;
pub mod tenants;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use generations::GenerationRepository;
pub use images::ImageRepository;
pub use tenants::TenantRepository;
pub use users::UserRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique slug or email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map unique and check violations to `Conflict`, everything else to `Database`.
fn map_constraint(e: sqlx::Error, conflict: impl FnOnce() -> String) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && (db_err.is_unique_violation() || db_err.is_check_violation())
    {
        return RepositoryError::Conflict(conflict());
    }
    RepositoryError::Database(e)
}
