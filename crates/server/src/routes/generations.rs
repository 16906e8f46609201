//! Generation endpoints: the paid workflow and the history.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use serde_json::{Value, json};

use style_preview_core::GenerationId;

use crate::error::{AppError, Result};
use crate::generation::{GenerationOutcome, GenerationRequest, Workflow};
use crate::middleware::{OptionalUser, RequireSalon};
use crate::routes::extract::path_id;
use crate::state::AppState;

/// Run a prompt or style-reference generation.
pub async fn create(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    body: Bytes,
) -> Result<Json<Value>> {
    let principal = user.as_ref().map(|u| u.principal());
    let request = GenerationRequest::from_json(&body);
    let outcome = state
        .orchestrator()
        .run(principal.as_ref(), &request, Workflow::Standard)
        .await?;

    Ok(Json(json!({
        "message": "Generation completed successfully",
        "generation": outcome.generation,
        "credits": outcome.credits,
    })))
}

/// Apply a style-library photo to a client photo. Hair salons only.
pub async fn style_transfer(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    body: Bytes,
) -> Result<Json<Value>> {
    let principal = user.as_ref().map(|u| u.principal());
    let request = GenerationRequest::from_json(&body);
    let outcome = state
        .orchestrator()
        .run(principal.as_ref(), &request, Workflow::StyleTransfer)
        .await?;

    Ok(Json(json!({
        "message": "Style transfer completed successfully",
        "generation": with_style_name(&outcome),
        "credits": outcome.credits,
    })))
}

fn with_style_name(outcome: &GenerationOutcome) -> Value {
    let mut generation = json!(outcome.generation);
    if let Some(fields) = generation.as_object_mut() {
        fields.insert("hairStyleName".to_string(), json!(outcome.style_name));
    }
    generation
}

/// The salon's generation history, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireSalon(_, tenant_id): RequireSalon,
) -> Result<Json<Value>> {
    let generations = state.generations().list_by_tenant(tenant_id).await?;
    Ok(Json(json!({ "generations": generations })))
}

pub async fn show(
    State(state): State<AppState>,
    RequireSalon(_, tenant_id): RequireSalon,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: GenerationId = path_id(&id, "Generation")?;
    let generation = state
        .generations()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Generation".to_string()))?;

    if generation.tenant_id != tenant_id {
        return Err(AppError::Forbidden(
            "Generation belongs to another salon".to_string(),
        ));
    }

    Ok(Json(json!({ "generation": generation })))
}
