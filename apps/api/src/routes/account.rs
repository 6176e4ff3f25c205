//! Account summary and per-user settings.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::handlers::MessageResponse;
use crate::auth::CallerId;
use crate::errors::{AppError, Resource};
use crate::extract::AppJson;
use crate::resumes::service::list_resumes;
use crate::routes::templates::template_info;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub resume_count: usize,
    pub resume_ids: Vec<String>,
    pub resumes: Vec<ResumeSummary>,
    pub created_at: DateTime<Utc>,
    /// Bumped by every write to the user, including resume edits.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummary {
    pub id: String,
    pub full_name: String,
    pub template: String,
    /// Display name from the template catalog.
    pub template_name: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub has_api_key: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    /// Blank or null clears the stored key.
    #[serde(alias = "openaiApiKey")]
    pub api_key: Option<String>,
}

/// GET /me
pub async fn handle_me(
    State(state): State<AppState>,
    caller: CallerId,
) -> Result<Json<AccountSummary>, AppError> {
    let user = state
        .store
        .find_user(caller.as_str())
        .await?
        .ok_or(AppError::NotFound(Resource::User))?;
    let resumes: Vec<ResumeSummary> = list_resumes(state.store.as_ref(), caller.as_str())
        .await?
        .into_iter()
        .map(|resume| ResumeSummary {
            template_name: template_info(Some(&resume.template)).name,
            id: resume.id,
            full_name: resume.content.full_name,
            template: resume.template,
        })
        .collect();

    Ok(Json(AccountSummary {
        id: user.id,
        email: user.email,
        name: user.name,
        image: user.image,
        resume_count: resumes.len(),
        resume_ids: resumes.iter().map(|r| r.id.clone()).collect(),
        resumes,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }))
}

/// GET /settings
pub async fn handle_get_settings(
    State(state): State<AppState>,
    caller: CallerId,
) -> Result<Json<SettingsResponse>, AppError> {
    let user = state
        .store
        .find_user(caller.as_str())
        .await?
        .ok_or(AppError::NotFound(Resource::User))?;
    Ok(Json(SettingsResponse {
        has_api_key: user.api_key.is_some_and(|key| !key.is_empty()),
    }))
}

/// POST /settings
pub async fn handle_update_settings(
    State(state): State<AppState>,
    caller: CallerId,
    AppJson(update): AppJson<SettingsUpdate>,
) -> Result<Json<MessageResponse>, AppError> {
    let api_key = update
        .api_key
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty());
    let stored = api_key.is_some();

    let result = state.store.set_api_key(caller.as_str(), api_key).await?;
    if result.matched == 0 {
        return Err(AppError::NotFound(Resource::User));
    }

    info!(
        "User {} {} their AI provider key",
        caller.as_str(),
        if stored { "stored" } else { "cleared" }
    );
    Ok(Json(MessageResponse {
        message: "Settings updated successfully".to_string(),
    }))
}
