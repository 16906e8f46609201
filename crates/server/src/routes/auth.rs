//! Signup, login and session routes.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalUser, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::routes::extract::ApiJson;
use crate::services::auth::SignupRequest;
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Session identity as returned to clients.
pub(crate) fn user_json(user: &CurrentUser) -> Value {
    json!({
        "id": user.id,
        "email": user.email,
        "name": user.name,
        "role": user.role,
        "salonId": user.tenant_id,
        "salonSlug": user.tenant_slug,
    })
}

/// Create a salon operator account and its salon.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse> {
    let user = state
        .auth()
        .signup(&request, state.policy().signup_credits)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": {
                "id": user.id,
                "email": user.email,
                "name": user.name,
                "role": user.role,
            },
        })),
    ))
}

/// Check credentials and start a session.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(form): ApiJson<LoginForm>,
) -> Result<Json<Value>> {
    let current = state.auth().login(&form.email, &form.password).await?;

    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&current.id, Some(current.email.as_str()));

    tracing::info!(user_id = %current.id, role = %current.role, "User logged in");
    Ok(Json(json!({
        "message": "Logged in successfully",
        "user": user_json(&current),
    })))
}

/// End the session.
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

/// The logged-in user, or `null`.
pub async fn current_session(OptionalUser(user): OptionalUser) -> Json<Value> {
    Json(json!({ "user": user.as_ref().map(user_json) }))
}
