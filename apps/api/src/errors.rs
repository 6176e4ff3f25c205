use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::previews::PreviewError;
use crate::store::StoreError;

/// What a `NotFound` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Resume,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::User => f.write_str("User"),
            Resource::Resume => f.write_str("Resume"),
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`;
/// the body is always `{ "error": …, "details"?: … }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(Resource),

    #[error("Resume not modified")]
    NotModified,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("AI provider error: {0}")]
    Upstream(#[from] LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// How an AI provider failure is reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamFailure {
    InvalidKey,
    RateLimited,
    Other,
}

impl UpstreamFailure {
    /// Classifies by status first, then by the provider's message text.
    pub fn classify(err: &LlmError) -> Self {
        match err {
            LlmError::MissingApiKey => UpstreamFailure::Other,
            LlmError::RateLimited { .. } => UpstreamFailure::RateLimited,
            LlmError::Api { status, message } => match status {
                401 | 403 => UpstreamFailure::InvalidKey,
                429 => UpstreamFailure::RateLimited,
                _ => Self::sniff(message),
            },
            other => Self::sniff(&other.to_string()),
        }
    }

    fn sniff(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("api key") || lower.contains("api-key") {
            UpstreamFailure::InvalidKey
        } else if lower.contains("rate limit") {
            UpstreamFailure::RateLimited
        } else {
            UpstreamFailure::Other
        }
    }
}

impl From<PreviewError> for AppError {
    fn from(err: PreviewError) -> Self {
        match err {
            PreviewError::Io(e) => AppError::Internal(anyhow::Error::new(e)),
            invalid => AppError::Validation(invalid.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details): (StatusCode, String, Option<String>) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string(), None),
            AppError::NotModified => (StatusCode::BAD_REQUEST, self.to_string(), None),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone(), None),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string(), None),
            AppError::Store(StoreError::DuplicateEmail(_)) => {
                (StatusCode::CONFLICT, "User already exists".to_string(), None)
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Upstream(e) => {
                tracing::error!("AI provider error: {e}");
                match UpstreamFailure::classify(e) {
                    UpstreamFailure::InvalidKey => (
                        StatusCode::UNAUTHORIZED,
                        "Invalid AI provider API key".to_string(),
                        None,
                    ),
                    UpstreamFailure::RateLimited => (
                        StatusCode::TOO_MANY_REQUESTS,
                        "AI provider rate limit exceeded. Please try again later.".to_string(),
                        None,
                    ),
                    UpstreamFailure::Other => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("AI provider error: {e}"),
                        None,
                    ),
                }
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(e.to_string()),
                )
            }
        };

        let body = match details {
            Some(details) => json!({ "error": message, "details": details }),
            None => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}
