//! Caller identity: every protected handler takes a `CallerId`.
//!
//! Resolution order: `session` cookie, then `Authorization: Bearer`, both
//! looked up as server-side sessions. When `ALLOW_LEGACY_BEARER` is set, a
//! bearer value that is not a session is taken as the user id itself.

pub mod handlers;
pub mod password;
pub mod session;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, HeaderMap};
use chrono::Utc;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::state::AppState;

use self::session::{bearer_token, hash_token, session_cookie};

/// The authenticated user's id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

impl CallerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CallerId {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_caller(&parts.headers, state).await
    }
}

pub async fn resolve_caller(headers: &HeaderMap, state: &AppState) -> Result<CallerId, AppError> {
    let bearer = bearer_token(headers);

    for token in session_cookie(headers).iter().chain(bearer.iter()) {
        let token_hash = hash_token(token);
        let Some(session) = state.store.find_session(&token_hash).await? else {
            continue;
        };
        if session.is_expired(Utc::now()) {
            debug!("Discarding expired session for user {}", session.user_id);
            state.store.delete_session(&token_hash).await?;
            continue;
        }
        return Ok(CallerId(session.user_id));
    }

    if state.config.allow_legacy_bearer {
        if let Some(user_id) = bearer {
            warn!("Accepting unverified bearer identity for user {user_id}");
            return Ok(CallerId(user_id));
        }
    }

    Err(AppError::Unauthorized)
}
