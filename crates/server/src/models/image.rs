//! Uploaded client photos.

use chrono::{DateTime, Utc};
use serde::Serialize;

use style_preview_core::{ImageId, TenantId};

/// A client photo uploaded by a salon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub id: ImageId,
    #[serde(rename = "salonId")]
    pub tenant_id: TenantId,
    /// Hosted URL or `data:` URL of the photo.
    #[serde(rename = "filePath")]
    pub storage_ref: String,
    pub created_at: DateTime<Utc>,
}

impl UploadedImage {
    #[must_use]
    pub fn is_owned_by(&self, tenant_id: TenantId) -> bool {
        self.tenant_id == tenant_id
    }
}

#[derive(Debug, Clone)]
pub struct NewImage {
    pub tenant_id: TenantId,
    pub storage_ref: String,
}
