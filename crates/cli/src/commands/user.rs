//! User management commands.
//!
//! Admin accounts cannot be created through the public signup endpoint, so
//! this is the way to bootstrap one.
//!
//! # Usage
//!
//! ```bash
//! sp-cli user create -e admin@example.com -n "Admin Name" -r admin --password 'secret'
//! ```

use thiserror::Error;

use style_preview_core::{UserId, UserRole};
use style_preview_server::services::auth::{AuthError, AuthService};
use style_preview_server::store::Stores;

use super::{CommandError, connect};

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: admin, salon")]
    InvalidRole(String),

    /// A salon user needs a salon.
    #[error("--salon-slug is required for salon users")]
    MissingSalon,

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a user and return its ID.
pub async fn create_user(
    email: &str,
    name: &str,
    role: &str,
    salon_slug: Option<&str>,
    password: &str,
) -> Result<UserId, UserError> {
    let role: UserRole = role
        .parse()
        .map_err(|_| UserError::InvalidRole(role.to_owned()))?;
    if role == UserRole::Salon && salon_slug.is_none() {
        return Err(UserError::MissingSalon);
    }

    let pool = connect().await?;
    let stores = Stores::postgres(&pool);

    tracing::info!("Creating user: {} ({})", email, role);
    let user = AuthService::new(stores.users.as_ref(), stores.tenants.as_ref())
        .create_user(email, password, name, role, salon_slug)
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    Ok(user.id)
}
