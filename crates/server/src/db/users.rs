//! User accounts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use style_preview_core::{
    Email, SalonCategory, ServedAudience, TenantId, TenantStatus, UserId, UserRole,
};

use super::{RepositoryError, map_constraint};
use crate::models::{NewTenant, NewUser, ProfileUpdate, Tenant, User};
use crate::store::UserStore;

const USER_COLUMNS: &str =
    "id, email, name, role, tenant_id, image, password_hash, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: Email,
    name: String,
    role: UserRole,
    tenant_id: Option<TenantId>,
    image: Option<String>,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            role: row.role,
            tenant_id: row.tenant_id,
            image: row.image,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CreatedTenantRow {
    id: TenantId,
    name: String,
    slug: String,
    status: TenantStatus,
    category: SalonCategory,
    audience: ServedAudience,
    credits: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn email_conflict(email: &Email) -> String {
    format!("user with email '{email}' already exists")
}

/// Repository for user accounts.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    #[instrument(skip(self))]
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(User::from))
    }

    #[instrument(skip(self), fields(email = %email))]
    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(User::from))
    }

    #[instrument(skip(self, user), fields(email = %user.email, role = %user.role))]
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            r"
            INSERT INTO users (id, email, name, role, tenant_id, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(UserId::generate())
        .bind(user.email.as_str())
        .bind(&user.name)
        .bind(user.role)
        .bind(user.tenant_id)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint(e, || email_conflict(&user.email)))?;

        debug!(user_id = %row.id, "Created user");
        Ok(row.into())
    }

    #[instrument(skip(self, user, tenant), fields(email = %user.email, slug = %tenant.slug))]
    async fn create_with_tenant(
        &self,
        user: NewUser,
        tenant: NewTenant,
    ) -> Result<(User, Tenant), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let tenant_row: CreatedTenantRow = sqlx::query_as(
            r"
            INSERT INTO tenants (id, name, slug, status, category, audience, credits)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, slug, status, category, audience, credits, created_at, updated_at
            ",
        )
        .bind(TenantId::generate())
        .bind(&tenant.name)
        .bind(tenant.slug.as_str())
        .bind(tenant.status)
        .bind(tenant.category)
        .bind(tenant.audience)
        .bind(tenant.credits)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_constraint(e, || {
                format!("salon with slug '{}' already exists", tenant.slug)
            })
        })?;

        let user_row: UserRow = sqlx::query_as(&format!(
            r"
            INSERT INTO users (id, email, name, role, tenant_id, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(UserId::generate())
        .bind(user.email.as_str())
        .bind(&user.name)
        .bind(user.role)
        .bind(tenant_row.id)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint(e, || email_conflict(&user.email)))?;

        tx.commit().await?;

        let tenant = Tenant {
            id: tenant_row.id,
            name: tenant_row.name,
            slug: tenant_row.slug,
            status: tenant_row.status,
            category: tenant_row.category,
            audience: tenant_row.audience,
            credits: tenant_row.credits,
            style_library: Vec::new(),
            created_at: tenant_row.created_at,
            updated_at: tenant_row.updated_at,
        };
        debug!(user_id = %user_row.id, tenant_id = %tenant.id, "Created salon account");
        Ok((user_row.into(), tenant))
    }

    #[instrument(skip(self, update))]
    async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
    ) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r"
            UPDATE users SET
                name = $2,
                email = $3,
                image = COALESCE($4, image),
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&update.name)
        .bind(update.email.as_str())
        .bind(update.image.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint(e, || email_conflict(&update.email)))?;

        row.map(User::from).ok_or(RepositoryError::NotFound)
    }

    #[instrument(skip(self, password_hash))]
    async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
