//! Session-related types for authentication.
//!
//! Types stored in the session for authentication state, and the identity
//! triple the generation workflow consumes.

use serde::{Deserialize, Serialize};

use style_preview_core::{Email, TenantId, UserId, UserRole};

use super::User;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: UserRole,
    /// Bound salon for `salon` users.
    pub tenant_id: Option<TenantId>,
    pub tenant_slug: Option<String>,
}

impl CurrentUser {
    /// Build the session identity for a user and their salon slug, if any.
    #[must_use]
    pub fn from_user(user: &User, tenant_slug: Option<String>) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            tenant_id: user.tenant_id,
            tenant_slug,
        }
    }

    #[must_use]
    pub const fn principal(&self) -> Principal {
        Principal {
            principal_id: self.id,
            role: self.role,
            tenant_id: self.tenant_id,
        }
    }
}

/// `{principal_id, role, tenant_id}` identity of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: UserId,
    pub role: UserRole,
    pub tenant_id: Option<TenantId>,
}

impl Principal {
    /// The tenant a salon operator acts for. `None` for admins and for
    /// salon users whose tenant binding is missing.
    #[must_use]
    pub const fn operator_tenant(&self) -> Option<TenantId> {
        match self.role {
            UserRole::Salon => self.tenant_id,
            UserRole::Admin => None,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
