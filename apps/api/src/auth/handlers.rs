//! Axum route handlers for credential sign-up and sessions.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::{
    bearer_token, clear_cookie_header, generate_token, hash_token, session_cookie,
    session_cookie_header,
};
use crate::auth::CallerId;
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::user::{NewUser, SessionRecord};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// POST /auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    AppJson(request): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let (Some(name), Some(email), Some(password)) = (
        filled(request.name),
        filled(request.email),
        filled(request.password),
    ) else {
        return Err(AppError::Validation("Missing required fields".to_string()));
    };

    let email = normalize_email(&email);
    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let password_hash = hash_password(password).await?;
    let user = state
        .store
        .insert_user(NewUser {
            id: Uuid::new_v4().simple().to_string(),
            email,
            name: Some(name),
            image: None,
            password_hash: Some(password_hash),
        })
        .await?;

    info!("Created user {}", user.id);
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully".to_string(),
        }),
    ))
}

/// POST /auth/login
///
/// Issues a session token, returned both in the body (for bearer use) and
/// as an HttpOnly cookie.
pub async fn handle_login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<([(header::HeaderName, String); 1], Json<LoginResponse>), AppError> {
    let (Some(email), Some(password)) = (filled(request.email), filled(request.password)) else {
        return Err(AppError::Validation("Missing required fields".to_string()));
    };

    let user = state
        .store
        .find_user_by_email(&normalize_email(&email))
        .await?
        .ok_or(AppError::Unauthorized)?;
    let phc = user.password_hash.clone().ok_or(AppError::Unauthorized)?;
    if !verify_password(password, phc).await? {
        return Err(AppError::Unauthorized);
    }

    let token = generate_token();
    let now = Utc::now();
    let ttl = Duration::hours(state.config.session_ttl_hours);
    let expires_at = now + ttl;
    state
        .store
        .insert_session(SessionRecord {
            token_hash: hash_token(&token),
            user_id: user.id.clone(),
            created_at: now,
            expires_at,
        })
        .await?;

    info!("Started session for user {}", user.id);
    Ok((
        [(
            header::SET_COOKIE,
            session_cookie_header(&token, ttl.num_seconds()),
        )],
        Json(LoginResponse { token, expires_at }),
    ))
}

/// POST /auth/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    caller: CallerId,
    headers: HeaderMap,
) -> Result<(StatusCode, [(header::HeaderName, String); 1]), AppError> {
    for token in session_cookie(&headers).into_iter().chain(bearer_token(&headers)) {
        state.store.delete_session(&hash_token(&token)).await?;
    }
    info!("Ended session for user {}", caller.as_str());
    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_cookie_header())],
    ))
}

fn filled(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
