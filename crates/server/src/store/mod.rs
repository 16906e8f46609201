//! Storage seams for the persistence layer.
//!
//! Every handler and the generation workflow talk to these traits, never to a
//! concrete database. Two backends implement them:
//!
//! - [`crate::db`] - `PostgreSQL` repositories used in production
//! - [`memory::MemoryStore`] - a process-local store for tests and demos
//!
//! Both backends must make [`TenantStore::deduct_credits`] atomic: a balance
//! is only ever decremented if it covers the full amount at the moment of the
//! write.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use style_preview_core::{Email, GenerationId, ImageId, StyleId, TenantId, UserId};

use crate::db::{
    GenerationRepository, ImageRepository, RepositoryError, TenantRepository, UserRepository,
};
use crate::models::{
    GenerationRecord, NewGeneration, NewImage, NewStyleEntry, NewTenant, NewUser, ProfileUpdate,
    StyleLibraryEntry, Tenant, TenantUpdate, UploadedImage, User,
};

pub use memory::MemoryStore;

/// Outcome of a conditional credit decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deduction {
    /// The balance covered the amount and was decremented.
    Applied { remaining: i32 },
    /// The balance was too low; nothing changed.
    Insufficient { available: i32 },
}

/// Salon records, their style libraries and credit balances.
#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn get_by_id(&self, id: TenantId) -> Result<Option<Tenant>, RepositoryError>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tenant>, RepositoryError>;

    async fn list(&self) -> Result<Vec<Tenant>, RepositoryError>;

    /// Create a salon. Duplicate slugs fail with `Conflict`.
    async fn create(&self, tenant: NewTenant) -> Result<Tenant, RepositoryError>;

    /// Apply a partial update. Unknown ids fail with `NotFound`, slug
    /// collisions with `Conflict`.
    async fn update(&self, id: TenantId, update: TenantUpdate) -> Result<Tenant, RepositoryError>;

    /// Delete a salon and everything it owns.
    async fn delete(&self, id: TenantId) -> Result<(), RepositoryError>;

    /// Overwrite the balance.
    async fn update_credits(&self, id: TenantId, balance: i32) -> Result<(), RepositoryError>;

    /// Atomically subtract `amount` if the balance covers it.
    async fn deduct_credits(&self, id: TenantId, amount: i32)
    -> Result<Deduction, RepositoryError>;

    /// Add `amount` to the balance and return the new balance.
    async fn add_credits(&self, id: TenantId, amount: i32) -> Result<i32, RepositoryError>;

    async fn add_style(
        &self,
        id: TenantId,
        entry: NewStyleEntry,
    ) -> Result<StyleLibraryEntry, RepositoryError>;

    /// Remove a style entry. Missing entries fail with `NotFound`.
    async fn remove_style(&self, id: TenantId, style_id: StyleId) -> Result<(), RepositoryError>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Uploaded client photos.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn create(&self, image: NewImage) -> Result<UploadedImage, RepositoryError>;

    async fn get_by_id(&self, id: ImageId) -> Result<Option<UploadedImage>, RepositoryError>;

    /// Images of one salon, newest first.
    async fn list_by_tenant(&self, tenant_id: TenantId)
    -> Result<Vec<UploadedImage>, RepositoryError>;

    async fn delete(&self, id: ImageId) -> Result<(), RepositoryError>;
}

/// Append-only generation history.
#[async_trait]
pub trait GenerationStore: Send + Sync {
    async fn create(&self, generation: NewGeneration)
    -> Result<GenerationRecord, RepositoryError>;

    async fn get_by_id(&self, id: GenerationId)
    -> Result<Option<GenerationRecord>, RepositoryError>;

    /// Generations of one salon, newest first.
    async fn list_by_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<GenerationRecord>, RepositoryError>;
}

/// User accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Create a user. Duplicate emails fail with `Conflict`.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Create a salon and its first operator in one unit of work. The user's
    /// `tenant_id` is ignored and replaced with the new salon's id.
    async fn create_with_tenant(
        &self,
        user: NewUser,
        tenant: NewTenant,
    ) -> Result<(User, Tenant), RepositoryError>;

    async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
    ) -> Result<User, RepositoryError>;

    async fn update_password(&self, id: UserId, password_hash: &str)
    -> Result<(), RepositoryError>;
}

/// The full set of stores a running service needs.
#[derive(Clone)]
pub struct Stores {
    pub tenants: Arc<dyn TenantStore>,
    pub images: Arc<dyn ImageStore>,
    pub generations: Arc<dyn GenerationStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    /// `PostgreSQL`-backed stores sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            tenants: Arc::new(TenantRepository::new(pool.clone())),
            images: Arc::new(ImageRepository::new(pool.clone())),
            generations: Arc::new(GenerationRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool.clone())),
        }
    }

    /// Stores backed by one shared [`MemoryStore`].
    #[must_use]
    pub fn in_memory(store: &MemoryStore) -> Self {
        Self {
            tenants: Arc::new(store.clone()),
            images: Arc::new(store.clone()),
            generations: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
        }
    }
}
