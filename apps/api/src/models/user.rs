use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;

/// One row of `users`: the identity anchor that owns the embedded resumes.
///
/// `resumes` is kept as raw JSON; the resume service decides how to read it.
#[derive(Debug, Clone, FromRow)]
pub struct UserDocument {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub password_hash: Option<String>,
    pub api_key: Option<String>,
    pub resumes: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for sign-up. The resume list always starts empty.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SessionRecord {
    /// SHA-256 of the bearer token; the raw token is never stored.
    pub token_hash: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
