//! Axum route handlers for resume CRUD.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::handlers::MessageResponse;
use crate::auth::CallerId;
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::resume::{NewResume, Resume, ResumePatch};
use crate::resumes::service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TemplateUpdate {
    pub template: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TemplateUpdateResponse {
    pub success: bool,
    pub resume: Resume,
}

/// GET /resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    caller: CallerId,
) -> Result<Json<Vec<Resume>>, AppError> {
    let resumes = service::list_resumes(state.store.as_ref(), caller.as_str()).await?;
    Ok(Json(resumes))
}

/// POST /resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    caller: CallerId,
    AppJson(draft): AppJson<NewResume>,
) -> Result<(StatusCode, Json<Resume>), AppError> {
    let resume = service::create_resume(state.store.as_ref(), caller.as_str(), draft).await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

/// GET /resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    caller: CallerId,
    Path(resume_id): Path<String>,
) -> Result<Json<Resume>, AppError> {
    let resume = service::get_resume(state.store.as_ref(), caller.as_str(), &resume_id).await?;
    Ok(Json(resume))
}

/// PUT /resumes/:id
///
/// Keys present in the body replace the stored values; the rest are kept.
pub async fn handle_replace_resume(
    State(state): State<AppState>,
    caller: CallerId,
    Path(resume_id): Path<String>,
    AppJson(patch): AppJson<ResumePatch>,
) -> Result<Json<Resume>, AppError> {
    let resume = service::replace_content(
        state.store.as_ref(),
        &state.previews,
        caller.as_str(),
        &resume_id,
        patch,
    )
    .await?;
    Ok(Json(resume))
}

/// PATCH /resumes/:id
///
/// Template switch only. 400 when the template is already in place.
pub async fn handle_patch_template(
    State(state): State<AppState>,
    caller: CallerId,
    Path(resume_id): Path<String>,
    AppJson(update): AppJson<TemplateUpdate>,
) -> Result<Json<TemplateUpdateResponse>, AppError> {
    let template = update.template.unwrap_or_default();
    let resume =
        service::replace_template(state.store.as_ref(), caller.as_str(), &resume_id, &template)
            .await?;
    Ok(Json(TemplateUpdateResponse {
        success: true,
        resume,
    }))
}

/// DELETE /resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    caller: CallerId,
    Path(resume_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    service::delete_resume(
        state.store.as_ref(),
        &state.previews,
        caller.as_str(),
        &resume_id,
    )
    .await?;
    Ok(Json(MessageResponse {
        message: "Resume deleted successfully".to_string(),
    }))
}
