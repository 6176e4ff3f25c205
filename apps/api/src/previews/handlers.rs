//! Axum route handlers for the preview cache.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::CallerId;
use crate::errors::AppError;
use crate::extract::{AppJson, AppQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewCheckQuery {
    pub resume_id: Option<String>,
    pub template_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewCheckResponse {
    pub preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewDeleteQuery {
    pub resume_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewDeleteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSaveRequest {
    pub preview_image: Option<String>,
    pub resume_id: Option<String>,
    pub template_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSaveResponse {
    pub image_url: String,
}

/// GET /preview-check?resumeId=…&templateName=…
pub async fn handle_preview_check(
    State(state): State<AppState>,
    _caller: CallerId,
    AppQuery(query): AppQuery<PreviewCheckQuery>,
) -> Result<Json<PreviewCheckResponse>, AppError> {
    let (Some(resume_id), Some(template_name)) = (
        non_empty(query.resume_id),
        non_empty(query.template_name),
    ) else {
        return Err(AppError::Validation("Missing required parameters".to_string()));
    };

    let preview_url = state
        .previews
        .find_latest(&resume_id, &template_name)
        .await?;
    Ok(Json(PreviewCheckResponse { preview_url }))
}

/// DELETE /preview-delete?resumeId=…
pub async fn handle_preview_delete(
    State(state): State<AppState>,
    _caller: CallerId,
    AppQuery(query): AppQuery<PreviewDeleteQuery>,
) -> Result<Json<PreviewDeleteResponse>, AppError> {
    let resume_id = non_empty(query.resume_id)
        .ok_or_else(|| AppError::Validation("Missing resumeId parameter".to_string()))?;

    let deleted = state.previews.delete_for_resume(&resume_id).await?;
    Ok(Json(PreviewDeleteResponse {
        success: true,
        message: format!("Deleted {deleted} preview images"),
    }))
}

/// POST /preview-save
pub async fn handle_preview_save(
    State(state): State<AppState>,
    _caller: CallerId,
    AppJson(request): AppJson<PreviewSaveRequest>,
) -> Result<Json<PreviewSaveResponse>, AppError> {
    let (Some(image), Some(resume_id), Some(template_name)) = (
        non_empty(request.preview_image),
        non_empty(request.resume_id),
        non_empty(request.template_name),
    ) else {
        return Err(AppError::Validation("Missing required fields".to_string()));
    };

    let image_url = state
        .previews
        .save(&resume_id, &template_name, &image)
        .await?;
    Ok(Json(PreviewSaveResponse { image_url }))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
