//! Salon self-service: own salon, style library and settings.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use style_preview_core::{ServedAudience, StyleId, TenantId};

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::middleware::RequireSalon;
use crate::models::{NewStyleEntry, Tenant, TenantUpdate};
use crate::routes::extract::{ApiJson, UploadForm, path_id};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    pub services: Option<String>,
}

/// Load the caller's salon.
pub(crate) async fn own_tenant(state: &AppState, tenant_id: TenantId) -> Result<Tenant> {
    state
        .tenants()
        .get_by_id(tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Salon".to_string()))
}

/// The caller's salon with its style library.
pub async fn show(
    State(state): State<AppState>,
    RequireSalon(_, tenant_id): RequireSalon,
) -> Result<Json<Value>> {
    let salon = own_tenant(&state, tenant_id).await?;
    Ok(Json(json!({ "salon": salon })))
}

/// Add a reference photo to the style library.
#[instrument(skip_all)]
pub async fn add_hairstyle(
    State(state): State<AppState>,
    RequireSalon(_, tenant_id): RequireSalon,
    multipart: Multipart,
) -> Result<Json<Value>> {
    let tenant = own_tenant(&state, tenant_id).await?;
    if !tenant.is_active() {
        return Err(AppError::TenantSuspended);
    }

    let form = UploadForm::read(multipart, "image").await?;
    let (Some(name), Some(upload)) = (form.text("name"), form.file.as_ref()) else {
        return Err(AppError::BadRequest(
            "Name and image are required".to_string(),
        ));
    };

    let image_ref = state.host().store(upload).await?;
    let entry = state
        .tenants()
        .add_style(
            tenant.id,
            NewStyleEntry {
                name: name.to_owned(),
                image_ref,
            },
        )
        .await?;

    info!(tenant_id = %tenant.id, style_id = %entry.id, "Hair style added");
    Ok(Json(json!({
        "message": "Hair style uploaded successfully",
        "hairStyle": entry,
    })))
}

/// Remove a style-library entry.
#[instrument(skip_all)]
pub async fn delete_hairstyle(
    State(state): State<AppState>,
    RequireSalon(_, tenant_id): RequireSalon,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let style_id: StyleId = path_id(&id, "Hair style")?;
    state
        .tenants()
        .remove_style(tenant_id, style_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Hair style".to_string()),
            other => other.into(),
        })?;

    Ok(Json(json!({ "message": "Hair style deleted successfully" })))
}

/// Change which clients the salon serves.
pub async fn update_settings(
    State(state): State<AppState>,
    RequireSalon(_, tenant_id): RequireSalon,
    ApiJson(form): ApiJson<SettingsForm>,
) -> Result<Json<Value>> {
    let audience: ServedAudience = form
        .services
        .as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AppError::BadRequest("Invalid services value".to_string()))?;

    let salon = state
        .tenants()
        .update(
            tenant_id,
            TenantUpdate {
                audience: Some(audience),
                ..TenantUpdate::default()
            },
        )
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Salon".to_string()),
            other => other.into(),
        })?;

    Ok(Json(json!({
        "message": "Salon settings updated successfully",
        "salon": salon,
    })))
}
