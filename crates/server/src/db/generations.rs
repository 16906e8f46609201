//! Generation history. Rows are inserted once and never updated.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use style_preview_core::{GenerationId, GenerationKind, ImageId, StyleId, TenantId};

use super::RepositoryError;
use crate::models::{GenerationRecord, NewGeneration};
use crate::store::GenerationStore;

const GENERATION_COLUMNS: &str = "id, tenant_id, input_image_id, output_ref, prompt, style_id, \
     kind, variations, processing_ms, credit_cost, created_at";

#[derive(sqlx::FromRow)]
struct GenerationRow {
    id: GenerationId,
    tenant_id: TenantId,
    input_image_id: ImageId,
    output_ref: String,
    prompt: Option<String>,
    style_id: Option<StyleId>,
    kind: GenerationKind,
    variations: i32,
    processing_ms: i64,
    credit_cost: i32,
    created_at: DateTime<Utc>,
}

impl From<GenerationRow> for GenerationRecord {
    fn from(row: GenerationRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            input_image_id: row.input_image_id,
            output_ref: row.output_ref,
            prompt: row.prompt,
            style_id: row.style_id,
            kind: row.kind,
            variations: row.variations,
            processing_ms: row.processing_ms,
            credit_cost: row.credit_cost,
            created_at: row.created_at,
        }
    }
}

/// Repository for generation history.
#[derive(Clone)]
pub struct GenerationRepository {
    pool: PgPool,
}

impl GenerationRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenerationStore for GenerationRepository {
    #[instrument(skip(self, generation), fields(tenant_id = %generation.tenant_id, kind = %generation.kind))]
    async fn create(
        &self,
        generation: NewGeneration,
    ) -> Result<GenerationRecord, RepositoryError> {
        let row: GenerationRow = sqlx::query_as(&format!(
            r"
            INSERT INTO generations
                (id, tenant_id, input_image_id, output_ref, prompt, style_id,
                 kind, variations, processing_ms, credit_cost)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {GENERATION_COLUMNS}
            "
        ))
        .bind(GenerationId::generate())
        .bind(generation.tenant_id)
        .bind(generation.input_image_id)
        .bind(&generation.output_ref)
        .bind(generation.prompt.as_deref())
        .bind(generation.style_id)
        .bind(generation.kind)
        .bind(generation.variations)
        .bind(generation.processing_ms)
        .bind(generation.credit_cost)
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

        debug!(generation_id = %row.id, "Recorded generation");
        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn get_by_id(
        &self,
        id: GenerationId,
    ) -> Result<Option<GenerationRecord>, RepositoryError> {
        let row: Option<GenerationRow> = sqlx::query_as(&format!(
            "SELECT {GENERATION_COLUMNS} FROM generations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GenerationRecord::from))
    }

    #[instrument(skip(self))]
    async fn list_by_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<GenerationRecord>, RepositoryError> {
        let rows: Vec<GenerationRow> = sqlx::query_as(&format!(
            r"
            SELECT {GENERATION_COLUMNS}
            FROM generations
            WHERE tenant_id = $1
            ORDER BY created_at DESC, id
            "
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(GenerationRecord::from).collect())
    }
}
