//! Admin salon management.
//!
//! Every handler here except [`show_by_slug`] requires the admin role.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use style_preview_core::{SalonCategory, ServedAudience, Slug, TenantId, TenantStatus, UserRole};

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{NewTenant, TenantUpdate};
use crate::routes::extract::{ApiJson, path_id};
use crate::state::AppState;

/// Body of `POST /api/salons` and `PATCH /api/salons/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct SalonForm {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub category: Option<String>,
    #[serde(rename = "services")]
    pub audience: Option<String>,
    pub credits: Option<i64>,
}

impl SalonForm {
    fn status(&self) -> Result<Option<TenantStatus>> {
        parse_opt(self.status.as_deref(), "Invalid status")
    }

    fn category(&self) -> Result<Option<SalonCategory>> {
        parse_opt(self.category.as_deref(), "Invalid salon type")
    }

    fn audience(&self) -> Result<Option<ServedAudience>> {
        parse_opt(self.audience.as_deref(), "Invalid services")
    }

    fn slug(&self) -> Result<Option<Slug>> {
        self.slug
            .as_deref()
            .map(|s| {
                Slug::parse(s.trim()).map_err(|e| AppError::BadRequest(format!("Invalid slug: {e}")))
            })
            .transpose()
    }

    fn credits(&self) -> Result<Option<i32>> {
        self.credits
            .map(|c| i32::try_from(c).ok().filter(|c| *c >= 0))
            .map(|c| c.ok_or_else(|| AppError::BadRequest("Invalid credits".to_string())))
            .transpose()
    }

    fn has_required_fields(&self) -> bool {
        [&self.name, &self.slug, &self.status, &self.category, &self.audience]
            .iter()
            .all(|f| f.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }

    fn name(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned)
    }
}

fn parse_opt<T: std::str::FromStr>(value: Option<&str>, message: &str) -> Result<Option<T>> {
    value
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| AppError::BadRequest(message.to_owned()))
        })
        .transpose()
}

fn salon_not_found(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => AppError::NotFound("Salon".to_string()),
        other => other.into(),
    }
}

/// List every salon.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Value>> {
    let salons = state.tenants().list().await?;
    Ok(Json(json!({ "salons": salons })))
}

/// Create a salon.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(form): ApiJson<SalonForm>,
) -> Result<impl IntoResponse> {
    if !form.has_required_fields() {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }
    let (Some(name), Some(slug), Some(status), Some(category), Some(audience)) = (
        form.name(),
        form.slug()?,
        form.status()?,
        form.category()?,
        form.audience()?,
    ) else {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    };

    let tenant = state
        .tenants()
        .create(NewTenant {
            name,
            slug,
            status,
            category,
            audience,
            credits: form.credits()?.unwrap_or(0),
        })
        .await?;

    info!(tenant_id = %tenant.id, "Salon created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Salon created successfully", "salon": tenant })),
    ))
}

/// Get one salon.
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: TenantId = path_id(&id, "Salon")?;
    let salon = state
        .tenants()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Salon".to_string()))?;

    Ok(Json(json!({ "salon": salon })))
}

/// Partially update a salon, including its credit balance.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    ApiJson(form): ApiJson<SalonForm>,
) -> Result<Json<Value>> {
    let id: TenantId = path_id(&id, "Salon")?;
    let credits = form.credits()?;
    let update = TenantUpdate {
        name: form.name(),
        slug: form.slug()?,
        status: form.status()?,
        category: form.category()?,
        audience: form.audience()?,
    };

    let mut salon = state
        .tenants()
        .update(id, update)
        .await
        .map_err(salon_not_found)?;
    if let Some(balance) = credits {
        state
            .tenants()
            .update_credits(id, balance)
            .await
            .map_err(salon_not_found)?;
        salon.credits = balance;
    }

    info!(tenant_id = %salon.id, credits = salon.credits, "Salon updated");
    Ok(Json(json!({ "message": "Salon updated successfully", "salon": salon })))
}

/// Delete a salon with its images, generations and style library.
#[instrument(skip_all)]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: TenantId = path_id(&id, "Salon")?;
    state.tenants().delete(id).await.map_err(salon_not_found)?;

    info!(tenant_id = %id, "Salon deleted");
    Ok(Json(json!({ "message": "Salon deleted successfully" })))
}

/// Get a salon by slug. Admins see any salon; operators only their own.
pub async fn show_by_slug(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    if user.role == UserRole::Salon && user.tenant_slug.as_deref() != Some(slug.as_str()) {
        return Err(AppError::Forbidden(
            "You do not have access to this salon".to_string(),
        ));
    }

    let salon = state
        .tenants()
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Salon".to_string()))?;

    Ok(Json(json!({ "salon": salon })))
}
