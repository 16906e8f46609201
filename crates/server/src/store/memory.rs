//! In-memory implementation of every store trait.
//!
//! All state lives behind a single `tokio::sync::RwLock`, so multi-entity
//! operations (signup, cascading deletes) and the conditional credit
//! decrement are serialized exactly like a database transaction would
//! serialize them. Nothing survives a restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use style_preview_core::{Email, GenerationId, ImageId, StyleId, TenantId, UserId};

use super::{Deduction, GenerationStore, ImageStore, TenantStore, UserStore};
use crate::db::RepositoryError;
use crate::models::{
    GenerationRecord, NewGeneration, NewImage, NewStyleEntry, NewTenant, NewUser, ProfileUpdate,
    StyleLibraryEntry, Tenant, TenantUpdate, UploadedImage, User,
};

#[derive(Default)]
struct State {
    tenants: HashMap<TenantId, Tenant>,
    /// Insertion order doubles as creation order.
    images: Vec<UploadedImage>,
    generations: Vec<GenerationRecord>,
    users: HashMap<UserId, User>,
}

impl State {
    fn slug_taken(&self, slug: &str, except: Option<TenantId>) -> bool {
        self.tenants
            .values()
            .any(|t| t.slug == slug && Some(t.id) != except)
    }

    fn email_taken(&self, email: &Email, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| &u.email == email && Some(u.id) != except)
    }

    fn insert_tenant(&mut self, new: NewTenant) -> Result<Tenant, RepositoryError> {
        if self.slug_taken(new.slug.as_str(), None) {
            return Err(RepositoryError::Conflict(format!(
                "salon with slug '{}' already exists",
                new.slug
            )));
        }
        let now = Utc::now();
        let tenant = Tenant {
            id: TenantId::generate(),
            name: new.name,
            slug: new.slug.into(),
            status: new.status,
            category: new.category,
            audience: new.audience,
            credits: new.credits,
            style_library: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.tenants.insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    fn insert_user(&mut self, new: NewUser) -> Result<User, RepositoryError> {
        if self.email_taken(&new.email, None) {
            return Err(RepositoryError::Conflict(format!(
                "user with email '{}' already exists",
                new.email
            )));
        }
        let now = Utc::now();
        let user = User {
            id: UserId::generate(),
            email: new.email,
            name: new.name,
            role: new.role,
            tenant_id: new.tenant_id,
            image: None,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn tenant_mut(&mut self, id: TenantId) -> Result<&mut Tenant, RepositoryError> {
        self.tenants.get_mut(&id).ok_or(RepositoryError::NotFound)
    }
}

/// Process-local store shared by cloning.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TenantStore for MemoryStore {
    async fn get_by_id(&self, id: TenantId) -> Result<Option<Tenant>, RepositoryError> {
        Ok(self.state.read().await.tenants.get(&id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tenant>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.tenants.values().find(|t| t.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Tenant>, RepositoryError> {
        let state = self.state.read().await;
        let mut tenants: Vec<Tenant> = state.tenants.values().cloned().collect();
        tenants.sort_by_key(|t| t.created_at);
        Ok(tenants)
    }

    async fn create(&self, tenant: NewTenant) -> Result<Tenant, RepositoryError> {
        self.state.write().await.insert_tenant(tenant)
    }

    async fn update(&self, id: TenantId, update: TenantUpdate) -> Result<Tenant, RepositoryError> {
        let mut state = self.state.write().await;
        if let Some(slug) = &update.slug
            && state.slug_taken(slug.as_str(), Some(id))
        {
            return Err(RepositoryError::Conflict(format!(
                "salon with slug '{slug}' already exists"
            )));
        }

        let tenant = state.tenant_mut(id)?;
        if let Some(name) = update.name {
            tenant.name = name;
        }
        if let Some(slug) = update.slug {
            tenant.slug = slug.into();
        }
        if let Some(status) = update.status {
            tenant.status = status;
        }
        if let Some(category) = update.category {
            tenant.category = category;
        }
        if let Some(audience) = update.audience {
            tenant.audience = audience;
        }
        tenant.updated_at = Utc::now();
        Ok(tenant.clone())
    }

    async fn delete(&self, id: TenantId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if state.tenants.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        state.images.retain(|image| image.tenant_id != id);
        state.generations.retain(|generation| generation.tenant_id != id);
        for user in state.users.values_mut() {
            if user.tenant_id == Some(id) {
                user.tenant_id = None;
            }
        }
        Ok(())
    }

    async fn update_credits(&self, id: TenantId, balance: i32) -> Result<(), RepositoryError> {
        if balance < 0 {
            return Err(RepositoryError::Conflict(
                "credits cannot be negative".to_string(),
            ));
        }
        let mut state = self.state.write().await;
        let tenant = state.tenant_mut(id)?;
        tenant.credits = balance;
        tenant.updated_at = Utc::now();
        Ok(())
    }

    async fn deduct_credits(
        &self,
        id: TenantId,
        amount: i32,
    ) -> Result<Deduction, RepositoryError> {
        let mut state = self.state.write().await;
        let tenant = state.tenant_mut(id)?;
        if tenant.credits < amount {
            return Ok(Deduction::Insufficient {
                available: tenant.credits,
            });
        }
        tenant.credits -= amount;
        tenant.updated_at = Utc::now();
        Ok(Deduction::Applied {
            remaining: tenant.credits,
        })
    }

    async fn add_credits(&self, id: TenantId, amount: i32) -> Result<i32, RepositoryError> {
        let mut state = self.state.write().await;
        let tenant = state.tenant_mut(id)?;
        tenant.credits = tenant.credits.saturating_add(amount);
        tenant.updated_at = Utc::now();
        Ok(tenant.credits)
    }

    async fn add_style(
        &self,
        id: TenantId,
        entry: NewStyleEntry,
    ) -> Result<StyleLibraryEntry, RepositoryError> {
        let mut state = self.state.write().await;
        let tenant = state.tenant_mut(id)?;
        let entry = StyleLibraryEntry {
            id: StyleId::generate(),
            name: entry.name,
            image_ref: entry.image_ref,
            uploaded_at: Utc::now(),
        };
        tenant.style_library.push(entry.clone());
        Ok(entry)
    }

    async fn remove_style(&self, id: TenantId, style_id: StyleId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        let tenant = state.tenant_mut(id)?;
        let before = tenant.style_library.len();
        tenant.style_library.retain(|entry| entry.id != style_id);
        if tenant.style_library.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn create(&self, image: NewImage) -> Result<UploadedImage, RepositoryError> {
        let mut state = self.state.write().await;
        if !state.tenants.contains_key(&image.tenant_id) {
            return Err(RepositoryError::NotFound);
        }
        let image = UploadedImage {
            id: ImageId::generate(),
            tenant_id: image.tenant_id,
            storage_ref: image.storage_ref,
            created_at: Utc::now(),
        };
        state.images.push(image.clone());
        Ok(image)
    }

    async fn get_by_id(&self, id: ImageId) -> Result<Option<UploadedImage>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.images.iter().find(|image| image.id == id).cloned())
    }

    async fn list_by_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<UploadedImage>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .images
            .iter()
            .rev()
            .filter(|image| image.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: ImageId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        let before = state.images.len();
        state.images.retain(|image| image.id != id);
        if state.images.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl GenerationStore for MemoryStore {
    async fn create(
        &self,
        generation: NewGeneration,
    ) -> Result<GenerationRecord, RepositoryError> {
        let mut state = self.state.write().await;
        if !state.tenants.contains_key(&generation.tenant_id) {
            return Err(RepositoryError::NotFound);
        }
        let record = GenerationRecord {
            id: GenerationId::generate(),
            tenant_id: generation.tenant_id,
            input_image_id: generation.input_image_id,
            output_ref: generation.output_ref,
            prompt: generation.prompt,
            style_id: generation.style_id,
            kind: generation.kind,
            variations: generation.variations,
            processing_ms: generation.processing_ms,
            credit_cost: generation.credit_cost,
            created_at: Utc::now(),
        };
        state.generations.push(record.clone());
        Ok(record)
    }

    async fn get_by_id(
        &self,
        id: GenerationId,
    ) -> Result<Option<GenerationRecord>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.generations.iter().find(|g| g.id == id).cloned())
    }

    async fn list_by_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<GenerationRecord>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .generations
            .iter()
            .rev()
            .filter(|g| g.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| &u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        self.state.write().await.insert_user(user)
    }

    async fn create_with_tenant(
        &self,
        user: NewUser,
        tenant: NewTenant,
    ) -> Result<(User, Tenant), RepositoryError> {
        let mut state = self.state.write().await;
        // Check both constraints before writing anything so a failure leaves no partial state.
        if state.email_taken(&user.email, None) {
            return Err(RepositoryError::Conflict(format!(
                "user with email '{}' already exists",
                user.email
            )));
        }
        let tenant = state.insert_tenant(tenant)?;
        let user = state.insert_user(NewUser {
            tenant_id: Some(tenant.id),
            ..user
        })?;
        Ok((user, tenant))
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
    ) -> Result<User, RepositoryError> {
        let mut state = self.state.write().await;
        if state.email_taken(&update.email, Some(id)) {
            return Err(RepositoryError::Conflict(format!(
                "user with email '{}' already exists",
                update.email
            )));
        }
        let user = state.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        user.name = update.name;
        user.email = update.email;
        if let Some(image) = update.image {
            user.image = Some(image);
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        let user = state.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        password_hash.clone_into(&mut user.password_hash);
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use style_preview_core::{SalonCategory, ServedAudience, Slug, TenantStatus, UserRole};

    use super::*;

    fn new_tenant(slug: &str, credits: i32) -> NewTenant {
        NewTenant {
            name: "Demo Salon".to_string(),
            slug: Slug::parse(slug).unwrap(),
            status: TenantStatus::Active,
            category: SalonCategory::Barbershop,
            audience: ServedAudience::Both,
            credits,
        }
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: Email::parse(email).unwrap(),
            name: "Owner".to_string(),
            role: UserRole::Salon,
            tenant_id: None,
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let store = MemoryStore::new();
        TenantStore::create(&store, new_tenant("demo", 0)).await.unwrap();
        let err = TenantStore::create(&store, new_tenant("demo", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_deduct_never_goes_negative() {
        let store = MemoryStore::new();
        let tenant = TenantStore::create(&store, new_tenant("demo", 3)).await.unwrap();

        assert_eq!(
            store.deduct_credits(tenant.id, 2).await.unwrap(),
            Deduction::Applied { remaining: 1 }
        );
        assert_eq!(
            store.deduct_credits(tenant.id, 2).await.unwrap(),
            Deduction::Insufficient { available: 1 }
        );
        let tenant = TenantStore::get_by_id(&store, tenant.id).await.unwrap().unwrap();
        assert_eq!(tenant.credits, 1);
    }

    #[tokio::test]
    async fn test_update_credits_overwrites_balance() {
        let store = MemoryStore::new();
        let tenant = TenantStore::create(&store, new_tenant("demo", 3)).await.unwrap();

        store.update_credits(tenant.id, 40).await.unwrap();
        let tenant = TenantStore::get_by_id(&store, tenant.id).await.unwrap().unwrap();
        assert_eq!(tenant.credits, 40);

        let err = store.update_credits(tenant.id, -1).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        let err = store
            .update_credits(TenantId::generate(), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_deduct_unknown_tenant() {
        let store = MemoryStore::new();
        let err = store
            .deduct_credits(TenantId::generate(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_signup_conflict_leaves_no_tenant_behind() {
        let store = MemoryStore::new();
        store
            .create_with_tenant(new_user("a@salon.com"), new_tenant("first", 50))
            .await
            .unwrap();

        let err = store
            .create_with_tenant(new_user("a@salon.com"), new_tenant("second", 50))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert!(store.get_by_slug("second").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_tenant_cascades() {
        let store = MemoryStore::new();
        let (user, tenant) = store
            .create_with_tenant(new_user("a@salon.com"), new_tenant("demo", 5))
            .await
            .unwrap();
        let image = ImageStore::create(
            &store,
            NewImage {
                tenant_id: tenant.id,
                storage_ref: "data:image/png;base64,AAAA".to_string(),
            },
        )
        .await
        .unwrap();

        TenantStore::delete(&store, tenant.id).await.unwrap();

        assert!(ImageStore::get_by_id(&store, image.id).await.unwrap().is_none());
        let user = UserStore::get_by_id(&store, user.id).await.unwrap().unwrap();
        assert!(user.tenant_id.is_none());
    }

    #[tokio::test]
    async fn test_lists_are_newest_first() {
        let store = MemoryStore::new();
        let tenant = TenantStore::create(&store, new_tenant("demo", 0)).await.unwrap();
        let mut ids = Vec::new();
        for n in 0..3 {
            let image = ImageStore::create(
                &store,
                NewImage {
                    tenant_id: tenant.id,
                    storage_ref: format!("https://i.ibb.co/{n}.jpg"),
                },
            )
            .await
            .unwrap();
            ids.push(image.id);
        }
        ids.reverse();

        let listed: Vec<ImageId> = ImageStore::list_by_tenant(&store, tenant.id)
            .await
            .unwrap()
            .into_iter()
            .map(|image| image.id)
            .collect();
        assert_eq!(listed, ids);
    }
}
