//! Account self-service: profile and password.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::CurrentUser;
use crate::routes::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub image: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordForm {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// Update name, email and avatar. The session identity is refreshed so the
/// new name and email show up immediately.
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    ApiJson(form): ApiJson<ProfileForm>,
) -> Result<Json<Value>> {
    let user = state
        .auth()
        .update_profile(current.id, &form.name, &form.email, form.image)
        .await?;

    let refreshed = CurrentUser::from_user(&user, current.tenant_slug.clone());
    session
        .insert(crate::models::session_keys::CURRENT_USER, &refreshed)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "image": user.image,
            "role": user.role,
        },
    })))
}

/// Change the password after verifying the current one.
pub async fn change_password(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    ApiJson(form): ApiJson<PasswordForm>,
) -> Result<Json<Value>> {
    state
        .auth()
        .change_password(current.id, &form.current_password, &form.new_password)
        .await?;

    // New session id after a credential change
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    Ok(Json(json!({ "message": "Password changed successfully" })))
}
