//! Axum route handlers for AI drafting.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::auth::CallerId;
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::generation::generator::{generate_content, generate_sample};
use crate::llm_client::LlmClient;
use crate::models::resume::{ResumeContent, DEFAULT_TEMPLATE};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateContentRequest {
    pub prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateSampleRequest {
    pub template: Option<String>,
}

/// POST /generate-resume-content
///
/// Drafts full resume content from the caller's description. The result is
/// returned for review, not stored.
pub async fn handle_generate_content(
    State(state): State<AppState>,
    caller: CallerId,
    AppJson(request): AppJson<GenerateContentRequest>,
) -> Result<Json<ResumeContent>, AppError> {
    let prompt = request
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Prompt is required".to_string()))?;

    let llm = client_for(&state, &caller).await?;
    Ok(Json(generate_content(&llm, &prompt).await?))
}

/// POST /generate-resume
///
/// Sample content for a template, used to seed a new resume.
pub async fn handle_generate_sample(
    State(state): State<AppState>,
    caller: CallerId,
    AppJson(request): AppJson<GenerateSampleRequest>,
) -> Result<Json<ResumeContent>, AppError> {
    let template = request
        .template
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());

    let llm = client_for(&state, &caller).await?;
    Ok(Json(generate_sample(&llm, &template).await?))
}

/// The caller's stored key when they have one, otherwise the server key.
async fn client_for(state: &AppState, caller: &CallerId) -> Result<LlmClient, AppError> {
    let user_key = state
        .store
        .find_user(caller.as_str())
        .await?
        .and_then(|user| user.api_key)
        .filter(|key| !key.is_empty());
    Ok(state.llm.with_api_key(user_key))
}
