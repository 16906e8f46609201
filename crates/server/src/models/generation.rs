//! Generation history records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use style_preview_core::{GenerationId, GenerationKind, ImageId, StyleId, TenantId};

/// One completed, charged generation. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub id: GenerationId,
    #[serde(rename = "salonId")]
    pub tenant_id: TenantId,
    pub input_image_id: ImageId,
    #[serde(rename = "outputImagePath")]
    pub output_ref: String,
    pub prompt: Option<String>,
    #[serde(rename = "hairStyleId")]
    pub style_id: Option<StyleId>,
    #[serde(rename = "generationType")]
    pub kind: GenerationKind,
    pub variations: i32,
    /// Provider processing time in milliseconds.
    #[serde(rename = "processingTime")]
    pub processing_ms: i64,
    /// Credits actually charged for this generation.
    pub credit_cost: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewGeneration {
    pub tenant_id: TenantId,
    pub input_image_id: ImageId,
    pub output_ref: String,
    pub prompt: Option<String>,
    pub style_id: Option<StyleId>,
    pub kind: GenerationKind,
    pub variations: i32,
    pub processing_ms: i64,
    pub credit_cost: i32,
}
