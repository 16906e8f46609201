//! Authentication service.
//!
//! Password signup and login, profile edits and password changes. Salon
//! signups create the salon and its first operator together.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::Deserialize;
use tracing::{info, instrument};

use style_preview_core::{
    Email, SalonCategory, ServedAudience, Slug, TenantStatus, UserId, UserRole,
};

use crate::db::RepositoryError;
use crate::models::{CurrentUser, NewTenant, NewUser, ProfileUpdate, User};
use crate::store::{TenantStore, UserStore};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Signup form as posted by clients.
///
/// No `Debug`: it carries the plaintext password.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub salon_slug: Option<String>,
    pub salon_name: Option<String>,
    pub salon_type: Option<String>,
    pub salon_services: Option<String>,
}

/// Authentication service.
///
/// Borrows the stores for the duration of one request.
pub struct AuthService<'a> {
    users: &'a dyn UserStore,
    tenants: &'a dyn TenantStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn UserStore, tenants: &'a dyn TenantStore) -> Self {
        Self { users, tenants }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Register a salon operator together with a new salon.
    ///
    /// The salon starts `active` with `initial_credits` credits.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if email, password, name or role is blank.
    /// Returns `AuthError::AdminSignupRefused` for `role = admin`.
    /// Returns `AuthError::UserAlreadyExists` / `AuthError::SlugTaken` on duplicates.
    #[instrument(skip(self, request), fields(email = request.email.as_deref().unwrap_or_default()))]
    pub async fn signup(
        &self,
        request: &SignupRequest,
        initial_credits: i32,
    ) -> Result<User, AuthError> {
        let (Some(email), Some(password), Some(name), Some(role)) = (
            non_blank(request.email.as_deref()),
            non_blank(request.password.as_deref()),
            non_blank(request.name.as_deref()),
            non_blank(request.role.as_deref()),
        ) else {
            return Err(AuthError::MissingFields);
        };

        match role.parse::<UserRole>().map_err(|_| AuthError::InvalidRole)? {
            UserRole::Admin => return Err(AuthError::AdminSignupRefused),
            UserRole::Salon => {}
        }

        let email = Email::parse(email)?;
        validate_password(password)?;

        let slug = non_blank(request.salon_slug.as_deref())
            .ok_or(AuthError::MissingSalonField("Salon slug"))?;
        let slug = Slug::parse(slug)?;
        let category: SalonCategory = non_blank(request.salon_type.as_deref())
            .ok_or(AuthError::MissingSalonField("Salon type"))?
            .parse()
            .map_err(AuthError::InvalidSalonField)?;
        let audience: ServedAudience = non_blank(request.salon_services.as_deref())
            .ok_or(AuthError::MissingSalonField("Salon services"))?
            .parse()
            .map_err(AuthError::InvalidSalonField)?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }
        if self.tenants.get_by_slug(slug.as_str()).await?.is_some() {
            return Err(AuthError::SlugTaken);
        }

        let salon_name = non_blank(request.salon_name.as_deref()).unwrap_or(name);
        let tenant = NewTenant {
            name: salon_name.to_owned(),
            slug,
            status: TenantStatus::Active,
            category,
            audience,
            credits: initial_credits,
        };
        let user = NewUser {
            email,
            name: name.to_owned(),
            role: UserRole::Salon,
            tenant_id: None,
            password_hash: hash_password(password)?,
        };

        let (user, tenant) = self
            .users
            .create_with_tenant(user, tenant)
            .await
            .map_err(conflict_to_auth)?;

        info!(user_id = %user.id, tenant_id = %tenant.id, "Salon signed up");
        Ok(user)
    }

    /// Create an account directly, bypassing signup rules.
    ///
    /// Used by operator tooling to provision admins and extra salon
    /// operators. Salon users are bound to the existing salon `salon_slug`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SalonNotFound` if `salon_slug` does not exist.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: UserRole,
        salon_slug: Option<&str>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        if name.trim().is_empty() {
            return Err(AuthError::MissingFields);
        }

        let tenant_id = match role {
            UserRole::Admin => None,
            UserRole::Salon => {
                let slug = salon_slug.ok_or(AuthError::MissingSalonField("Salon slug"))?;
                let tenant = self
                    .tenants
                    .get_by_slug(slug)
                    .await?
                    .ok_or(AuthError::SalonNotFound)?;
                Some(tenant.id)
            }
        };

        let user = self
            .users
            .create(NewUser {
                email,
                name: name.trim().to_owned(),
                role,
                tenant_id,
                password_hash: hash_password(password)?,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// Returns the identity to store in the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        let tenant_slug = match user.tenant_id {
            Some(tenant_id) => self.tenants.get_by_id(tenant_id).await?.map(|t| t.slug),
            None => None,
        };

        Ok(CurrentUser::from_user(&user, tenant_slug))
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    // =========================================================================
    // Account Management
    // =========================================================================

    /// Change a user's password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCurrentPassword` if `current` is wrong.
    /// Returns `AuthError::WeakPassword` if `new` is too short.
    #[instrument(skip(self, current, new))]
    pub async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        if current.is_empty() || new.is_empty() {
            return Err(AuthError::MissingFields);
        }
        validate_password(new)?;

        let user = self.get_user(user_id).await?;
        verify_password(current, &user.password_hash)
            .map_err(|_| AuthError::InvalidCurrentPassword)?;

        let hash = hash_password(new)?;
        self.users.update_password(user_id, &hash).await?;

        info!("Password changed");
        Ok(())
    }

    /// Update a user's name, email and optionally their avatar.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if name or email is blank.
    /// Returns `AuthError::UserAlreadyExists` if the email belongs to someone else.
    #[instrument(skip(self, image))]
    pub async fn update_profile(
        &self,
        user_id: UserId,
        name: &str,
        email: &str,
        image: Option<String>,
    ) -> Result<User, AuthError> {
        let (Some(name), Some(email)) = (non_blank(Some(name)), non_blank(Some(email))) else {
            return Err(AuthError::MissingFields);
        };
        let email = Email::parse(email)?;

        self.users
            .update_profile(
                user_id,
                ProfileUpdate {
                    name: name.to_owned(),
                    email,
                    image,
                },
            )
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Map a signup race that slipped past the pre-checks.
fn conflict_to_auth(e: RepositoryError) -> AuthError {
    match e {
        RepositoryError::Conflict(msg) => AuthError::Conflict(msg),
        other => AuthError::Repository(other),
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
