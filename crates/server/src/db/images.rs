//! Uploaded client photos.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use style_preview_core::{ImageId, TenantId};

use super::RepositoryError;
use crate::models::{NewImage, UploadedImage};
use crate::store::ImageStore;

#[derive(sqlx::FromRow)]
struct ImageRow {
    id: ImageId,
    tenant_id: TenantId,
    storage_ref: String,
    created_at: DateTime<Utc>,
}

impl From<ImageRow> for UploadedImage {
    fn from(row: ImageRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            storage_ref: row.storage_ref,
            created_at: row.created_at,
        }
    }
}

/// Repository for uploaded image records.
#[derive(Clone)]
pub struct ImageRepository {
    pool: PgPool,
}

impl ImageRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImageStore for ImageRepository {
    #[instrument(skip(self, image), fields(tenant_id = %image.tenant_id))]
    async fn create(&self, image: NewImage) -> Result<UploadedImage, RepositoryError> {
        let row: ImageRow = sqlx::query_as(
            r"
            INSERT INTO images (id, tenant_id, storage_ref)
            VALUES ($1, $2, $3)
            RETURNING id, tenant_id, storage_ref, created_at
            ",
        )
        .bind(ImageId::generate())
        .bind(image.tenant_id)
        .bind(&image.storage_ref)
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
    async fn get_by_id(&self, id: ImageId) -> Result<Option<UploadedImage>, RepositoryError> {
        let row: Option<ImageRow> = sqlx::query_as(
            "SELECT id, tenant_id, storage_ref, created_at FROM images WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UploadedImage::from))
    }

    #[instrument(skip(self))]
    async fn list_by_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<UploadedImage>, RepositoryError> {
        let rows: Vec<ImageRow> = sqlx::query_as(
            r"
            SELECT id, tenant_id, storage_ref, created_at
            FROM images
            WHERE tenant_id = $1
            ORDER BY created_at DESC, id
            ",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UploadedImage::from).collect())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ImageId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
