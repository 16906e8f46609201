//! User accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use style_preview_core::{Email, TenantId, UserId, UserRole};

/// A user account.
///
/// Implements `Debug` manually so the password hash never reaches logs.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: UserRole,
    #[serde(rename = "salonId")]
    pub tenant_id: Option<TenantId>,
    /// Avatar image reference.
    pub image: Option<String>,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("tenant_id", &self.tenant_id)
            .field("image", &self.image)
            .field("password_hash", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Data for creating a user.
#[derive(Clone)]
pub struct NewUser {
    pub email: Email,
    pub name: String,
    pub role: UserRole,
    pub tenant_id: Option<TenantId>,
    pub password_hash: String,
}

/// Profile fields a user may edit about themselves.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: Email,
    /// `Some` replaces the avatar, `None` keeps the current one.
    pub image: Option<String>,
}
