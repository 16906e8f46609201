//! Tenant repository: salons, their style libraries and credit balances.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use style_preview_core::{SalonCategory, ServedAudience, Slug, StyleId, TenantId, TenantStatus};

use super::{RepositoryError, map_constraint};
use crate::models::{NewStyleEntry, NewTenant, StyleLibraryEntry, Tenant, TenantUpdate};
use crate::store::{Deduction, TenantStore};

const TENANT_COLUMNS: &str =
    "id, name, slug, status, category, audience, credits, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct TenantRow {
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

impl TenantRow {
    fn into_tenant(self, style_library: Vec<StyleLibraryEntry>) -> Tenant {
        Tenant {
            id: self.id,
            name: self.name,
            slug: self.slug,
            status: self.status,
            category: self.category,
            audience: self.audience,
            credits: self.credits,
            style_library,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StyleRow {
    id: StyleId,
    tenant_id: TenantId,
    name: String,
    image_ref: String,
    uploaded_at: DateTime<Utc>,
}

impl From<StyleRow> for StyleLibraryEntry {
    fn from(row: StyleRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            image_ref: row.image_ref,
            uploaded_at: row.uploaded_at,
        }
    }
}

/// Repository for salon database operations.
#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    /// Create a new tenant repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn styles_for(&self, id: TenantId) -> Result<Vec<StyleLibraryEntry>, RepositoryError> {
        let rows: Vec<StyleRow> = sqlx::query_as(
            r"
            SELECT id, tenant_id, name, image_ref, uploaded_at
            FROM style_entries
            WHERE tenant_id = $1
            ORDER BY uploaded_at, id
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(StyleLibraryEntry::from).collect())
    }

    async fn with_styles(&self, row: Option<TenantRow>) -> Result<Option<Tenant>, RepositoryError> {
        match row {
            Some(row) => {
                let styles = self.styles_for(row.id).await?;
                Ok(Some(row.into_tenant(styles)))
            }
            None => Ok(None),
        }
    }
}

fn slug_conflict(slug: &str) -> String {
    format!("salon with slug '{slug}' already exists")
}

#[async_trait]
impl TenantStore for TenantRepository {
    #[instrument(skip(self))]
    async fn get_by_id(&self, id: TenantId) -> Result<Option<Tenant>, RepositoryError> {
        let row: Option<TenantRow> =
            sqlx::query_as(&format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        self.with_styles(row).await
    }

    #[instrument(skip(self))]
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tenant>, RepositoryError> {
        let row: Option<TenantRow> =
            sqlx::query_as(&format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE slug = $1"))
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;

        self.with_styles(row).await
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Tenant>, RepositoryError> {
        let rows: Vec<TenantRow> = sqlx::query_as(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        let styles: Vec<StyleRow> = sqlx::query_as(
            r"
            SELECT id, tenant_id, name, image_ref, uploaded_at
            FROM style_entries
            ORDER BY uploaded_at, id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_tenant: HashMap<TenantId, Vec<StyleLibraryEntry>> = HashMap::new();
        for style in styles {
            by_tenant
                .entry(style.tenant_id)
                .or_default()
                .push(style.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let styles = by_tenant.remove(&row.id).unwrap_or_default();
                row.into_tenant(styles)
            })
            .collect())
    }

    #[instrument(skip(self, tenant), fields(slug = %tenant.slug))]
    async fn create(&self, tenant: NewTenant) -> Result<Tenant, RepositoryError> {
        let row: TenantRow = sqlx::query_as(&format!(
            r"
            INSERT INTO tenants (id, name, slug, status, category, audience, credits)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TENANT_COLUMNS}
            "
        ))
        .bind(TenantId::generate())
        .bind(&tenant.name)
        .bind(tenant.slug.as_str())
        .bind(tenant.status)
        .bind(tenant.category)
        .bind(tenant.audience)
        .bind(tenant.credits)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint(e, || slug_conflict(tenant.slug.as_str())))?;

        debug!(tenant_id = %row.id, "Created tenant");
        Ok(row.into_tenant(Vec::new()))
    }

    #[instrument(skip(self, update))]
    async fn update(&self, id: TenantId, update: TenantUpdate) -> Result<Tenant, RepositoryError> {
        let slug = update.slug.as_ref().map(Slug::as_str);
        let row: Option<TenantRow> = sqlx::query_as(&format!(
            r"
            UPDATE tenants SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                status = COALESCE($4, status),
                category = COALESCE($5, category),
                audience = COALESCE($6, audience),
                updated_at = now()
            WHERE id = $1
            RETURNING {TENANT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(update.name.as_deref())
        .bind(slug)
        .bind(update.status)
        .bind(update.category)
        .bind(update.audience)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint(e, || slug_conflict(slug.unwrap_or_default())))?;

        let row = row.ok_or(RepositoryError::NotFound)?;
        let styles = self.styles_for(row.id).await?;
        Ok(row.into_tenant(styles))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: TenantId) -> Result<(), RepositoryError> {
        // images, generations and style entries cascade; users are unbound
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_credits(&self, id: TenantId, balance: i32) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE tenants SET credits = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(balance)
                .execute(&self.pool)
                .await
                .map_err(|e| map_constraint(e, || "credits cannot be negative".to_owned()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn deduct_credits(
        &self,
        id: TenantId,
        amount: i32,
    ) -> Result<Deduction, RepositoryError> {
        // Check and decrement in one statement; the row lock serializes concurrent callers.
        let remaining: Option<(i32,)> = sqlx::query_as(
            r"
            UPDATE tenants
            SET credits = credits - $2, updated_at = now()
            WHERE id = $1 AND credits >= $2
            RETURNING credits
            ",
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;

        if let Some((remaining,)) = remaining {
            return Ok(Deduction::Applied { remaining });
        }

        let available: Option<(i32,)> = sqlx::query_as("SELECT credits FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        available.map_or(Err(RepositoryError::NotFound), |(available,)| {
            Ok(Deduction::Insufficient { available })
        })
    }

    #[instrument(skip(self))]
    async fn add_credits(&self, id: TenantId, amount: i32) -> Result<i32, RepositoryError> {
        let row: Option<(i32,)> = sqlx::query_as(
            r"
            UPDATE tenants
            SET credits = credits + $2, updated_at = now()
            WHERE id = $1
            RETURNING credits
            ",
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(credits,)| credits).ok_or(RepositoryError::NotFound)
    }

    #[instrument(skip(self, entry), fields(name = %entry.name))]
    async fn add_style(
        &self,
        id: TenantId,
        entry: NewStyleEntry,
    ) -> Result<StyleLibraryEntry, RepositoryError> {
        let row: StyleRow = sqlx::query_as(
            r"
            INSERT INTO style_entries (id, tenant_id, name, image_ref)
            VALUES ($1, $2, $3, $4)
            RETURNING id, tenant_id, name, image_ref, uploaded_at
            ",
        )
        .bind(StyleId::generate())
        .bind(id)
        .bind(&entry.name)
        .bind(&entry.image_ref)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn remove_style(&self, id: TenantId, style_id: StyleId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM style_entries WHERE id = $1 AND tenant_id = $2")
            .bind(style_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
