//! Client photo uploads.

use axum::{
    Json,
    extract::{DefaultBodyLimit, Multipart, Path, State},
};
use serde_json::{Value, json};
use tracing::{info, instrument};

use style_preview_core::{ImageId, TenantId};

use crate::error::{AppError, Result};
use crate::hosting::MAX_UPLOAD_BYTES;
use crate::middleware::RequireSalon;
use crate::models::{NewImage, UploadedImage};
use crate::routes::extract::{UploadForm, path_id};
use crate::routes::salon::own_tenant;
use crate::state::AppState;

/// Body limit for multipart uploads: the largest image plus form overhead.
#[must_use]
pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 1024 * 1024)
}

/// Load an image the caller's salon owns.
async fn owned_image(state: &AppState, tenant_id: TenantId, raw_id: &str) -> Result<UploadedImage> {
    let id: ImageId = path_id(raw_id, "Image")?;
    let image = state
        .images()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image".to_string()))?;

    if !image.is_owned_by(tenant_id) {
        return Err(AppError::Forbidden(
            "Image belongs to another salon".to_string(),
        ));
    }
    Ok(image)
}

/// Upload a client photo (multipart field `image`).
#[instrument(skip_all)]
pub async fn upload(
    State(state): State<AppState>,
    RequireSalon(_, tenant_id): RequireSalon,
    multipart: Multipart,
) -> Result<Json<Value>> {
    let tenant = own_tenant(&state, tenant_id).await?;
    if !tenant.is_active() {
        return Err(AppError::TenantSuspended);
    }

    let form = UploadForm::read(multipart, "image").await?;
    let upload = form
        .file
        .ok_or_else(|| AppError::BadRequest("Image file is required".to_string()))?;

    let storage_ref = state.host().store(&upload).await?;
    let image = state
        .images()
        .create(NewImage {
            tenant_id: tenant.id,
            storage_ref,
        })
        .await?;

    info!(tenant_id = %tenant.id, image_id = %image.id, host = state.host().name(), "Image uploaded");
    Ok(Json(json!({
        "message": "Image uploaded successfully",
        "image": image,
    })))
}

/// The salon's images, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireSalon(_, tenant_id): RequireSalon,
) -> Result<Json<Value>> {
    let images = state.images().list_by_tenant(tenant_id).await?;
    Ok(Json(json!({ "images": images })))
}

pub async fn show(
    State(state): State<AppState>,
    RequireSalon(_, tenant_id): RequireSalon,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let image = owned_image(&state, tenant_id, &id).await?;
    Ok(Json(json!({ "image": image })))
}

#[instrument(skip_all)]
pub async fn delete(
    State(state): State<AppState>,
    RequireSalon(_, tenant_id): RequireSalon,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let image = owned_image(&state, tenant_id, &id).await?;
    state.images().delete(image.id).await?;

    info!(image_id = %image.id, "Image deleted");
    Ok(Json(json!({ "message": "Image deleted successfully" })))
}
