//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! sp-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STYLEPREVIEW_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! Migrations live in `crates/server/migrations/` and are embedded in the
//! server crate, so the CLI always applies the schema the server was built with.

use thiserror::Error;

use style_preview_server::db::MIGRATOR;

use super::{CommandError, connect};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply every pending migration.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
