//! Resume collection manager: CRUD over the `resumes` array embedded in the
//! caller's user document.
//!
//! Every mutation reads the whole user document, edits the array in memory
//! and writes the whole array back in one update. There is no revision check:
//! concurrent edits to the same user resolve as last write wins.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::{AppError, Resource};
use crate::models::resume::{stored_identifier, NewResume, Resume, ResumePatch};
use crate::models::user::UserDocument;
use crate::previews::PreviewStore;
use crate::store::UserStore;

/// All of the caller's resumes, in stored order.
///
/// A missing or non-array `resumes` field reads as empty. Entries that are
/// not readable as a resume are skipped.
pub async fn list_resumes(store: &dyn UserStore, user_id: &str) -> Result<Vec<Resume>, AppError> {
    let entries = stored_entries(load_user(store, user_id).await?);
    Ok(entries
        .iter()
        .filter_map(|entry| match Resume::from_stored(entry) {
            Ok(resume) => Some(resume),
            Err(e) => {
                warn!("Skipping unreadable resume entry for user {user_id}: {e}");
                None
            }
        })
        .collect())
}

pub async fn get_resume(
    store: &dyn UserStore,
    user_id: &str,
    resume_id: &str,
) -> Result<Resume, AppError> {
    let entries = stored_entries(load_user(store, user_id).await?);
    let index = position(&entries, resume_id).ok_or(AppError::NotFound(Resource::Resume))?;
    decode(&entries[index])
}

/// Appends a new resume. Does not create the user when it is missing.
pub async fn create_resume(
    store: &dyn UserStore,
    user_id: &str,
    draft: NewResume,
) -> Result<Resume, AppError> {
    require("fullName", &draft.content.full_name)?;
    require("email", &draft.content.email)?;

    let resume = Resume::create(draft, Utc::now());
    let result = store.push_resume(user_id, encode(&resume)?).await?;
    if result.matched == 0 {
        return Err(AppError::NotFound(Resource::User));
    }

    info!("Created resume {} for user {user_id}", resume.id);
    Ok(resume)
}

/// Shallow-merges `patch` over the stored resume and refreshes `updatedAt`.
/// Cached previews of the resume are dropped afterwards, best effort.
pub async fn replace_content(
    store: &dyn UserStore,
    previews: &PreviewStore,
    user_id: &str,
    resume_id: &str,
    patch: ResumePatch,
) -> Result<Resume, AppError> {
    let mut entries = stored_entries(load_user(store, user_id).await?);
    let index = position(&entries, resume_id).ok_or(AppError::NotFound(Resource::Resume))?;

    let mut resume = decode(&entries[index])?;
    resume.apply(patch);
    resume.touch(Utc::now());
    entries[index] = encode(&resume)?;

    let result = store.set_resumes(user_id, entries).await?;
    if result.matched == 0 {
        return Err(AppError::NotFound(Resource::User));
    }

    previews.discard_for_resume(resume_id).await;

    info!("Updated resume {resume_id} for user {user_id}");
    Ok(resume)
}

/// Changes only the template. Writing the template already in place is
/// reported as `NotModified`.
pub async fn replace_template(
    store: &dyn UserStore,
    user_id: &str,
    resume_id: &str,
    template: &str,
) -> Result<Resume, AppError> {
    if template.trim().is_empty() {
        return Err(AppError::Validation("template is required".to_string()));
    }

    let mut entries = stored_entries(load_user(store, user_id).await?);
    let index = position(&entries, resume_id).ok_or(AppError::NotFound(Resource::Resume))?;

    let mut resume = decode(&entries[index])?;
    if resume.template == template {
        debug!("Resume {resume_id} already uses template '{template}'");
        return Err(AppError::NotModified);
    }
    resume.template = template.to_string();
    resume.touch(Utc::now());
    entries[index] = encode(&resume)?;

    let result = store.set_resumes(user_id, entries).await?;
    if result.matched == 0 {
        return Err(AppError::NotFound(Resource::Resume));
    }
    if result.modified == 0 {
        return Err(AppError::NotModified);
    }

    info!("Resume {resume_id} switched to template '{template}'");
    Ok(resume)
}

/// Removes the resume with `resume_id`, keeping the others in order.
///
/// An id that matches nothing still rewrites the array and succeeds.
pub async fn delete_resume(
    store: &dyn UserStore,
    previews: &PreviewStore,
    user_id: &str,
    resume_id: &str,
) -> Result<(), AppError> {
    let entries = stored_entries(load_user(store, user_id).await?);
    let before = entries.len();
    let remaining: Vec<Value> = entries
        .into_iter()
        .filter(|entry| stored_identifier(entry).as_deref() != Some(resume_id))
        .collect();
    if remaining.len() == before {
        debug!("Delete of resume {resume_id} matched no entry for user {user_id}");
    }

    let result = store.set_resumes(user_id, remaining).await?;
    if result.matched == 0 {
        return Err(AppError::NotFound(Resource::User));
    }

    previews.discard_for_resume(resume_id).await;

    info!("Deleted resume {resume_id} for user {user_id}");
    Ok(())
}

async fn load_user(store: &dyn UserStore, user_id: &str) -> Result<UserDocument, AppError> {
    store
        .find_user(user_id)
        .await?
        .ok_or(AppError::NotFound(Resource::User))
}

fn stored_entries(user: UserDocument) -> Vec<Value> {
    match user.resumes {
        Some(Value::Array(entries)) => entries,
        _ => Vec::new(),
    }
}

/// Exact string comparison, no case folding or trimming.
fn position(entries: &[Value], resume_id: &str) -> Option<usize> {
    entries
        .iter()
        .position(|entry| stored_identifier(entry).as_deref() == Some(resume_id))
}

fn decode(entry: &Value) -> Result<Resume, AppError> {
    Resume::from_stored(entry)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("stored resume is malformed: {e}")))
}

fn encode(resume: &Resume) -> Result<Value, AppError> {
    resume
        .to_stored()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode resume: {e}")))
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}
