//! User store: collection-level reads and writes over user documents.
//!
//! `PgUserStore` is the production backend. `AppState` carries an
//! `Arc<dyn UserStore>` so handlers and services never name the backend.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::models::user::{NewUser, SessionRecord, UserDocument};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgUserStore;

/// Outcome of a single-document update, in document-database terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateResult {
    /// Documents the filter matched (0 or 1).
    pub matched: u64,
    /// Documents whose stored value actually changed.
    pub modified: u64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("a user with email '{0}' already exists")]
    DuplicateEmail(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, user_id: &str) -> Result<Option<UserDocument>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserDocument>, StoreError>;

    async fn insert_user(&self, user: NewUser) -> Result<UserDocument, StoreError>;

    /// Appends one entry to the user's `resumes` array in a single update.
    async fn push_resume(&self, user_id: &str, resume: Value) -> Result<UpdateResult, StoreError>;

    /// Replaces the whole `resumes` array in a single update.
    async fn set_resumes(
        &self,
        user_id: &str,
        resumes: Vec<Value>,
    ) -> Result<UpdateResult, StoreError>;

    async fn set_api_key(
        &self,
        user_id: &str,
        api_key: Option<String>,
    ) -> Result<UpdateResult, StoreError>;

    async fn insert_session(&self, session: SessionRecord) -> Result<(), StoreError>;

    async fn find_session(&self, token_hash: &str) -> Result<Option<SessionRecord>, StoreError>;

    async fn delete_session(&self, token_hash: &str) -> Result<(), StoreError>;
}
