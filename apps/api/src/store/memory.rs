//! In-memory `UserStore` for tests. Mirrors the update counts the
//! PostgreSQL backend reports.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::models::user::{NewUser, SessionRecord, UserDocument};
use crate::store::{StoreError, UpdateResult, UserStore};

#[derive(Default)]
struct Inner {
    users: HashMap<String, UserDocument>,
    sessions: HashMap<String, SessionRecord>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user document as-is, bypassing sign-up.
    pub async fn put_user(&self, user: UserDocument) {
        self.inner.write().await.users.insert(user.id.clone(), user);
    }

    pub async fn resumes_of(&self, user_id: &str) -> Option<Value> {
        self.inner
            .read()
            .await
            .users
            .get(user_id)
            .and_then(|u| u.resumes.clone())
    }
}

/// A bare user document with an empty resume list.
pub fn user_document(id: &str, email: &str) -> UserDocument {
    let now = Utc::now();
    UserDocument {
        id: id.to_string(),
        email: email.to_string(),
        name: Some("Test User".to_string()),
        image: None,
        password_hash: None,
        api_key: None,
        resumes: Some(Value::Array(Vec::new())),
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, user_id: &str) -> Result<Option<UserDocument>, StoreError> {
        Ok(self.inner.read().await.users.get(user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserDocument>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserDocument, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail(user.email));
        }
        let now = Utc::now();
        let doc = UserDocument {
            id: user.id,
            email: user.email,
            name: user.name,
            image: user.image,
            password_hash: user.password_hash,
            api_key: None,
            resumes: Some(Value::Array(Vec::new())),
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }

    async fn push_resume(&self, user_id: &str, resume: Value) -> Result<UpdateResult, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(user) = inner.users.get_mut(user_id) else {
            return Ok(UpdateResult::default());
        };
        match user.resumes.as_mut() {
            Some(Value::Array(entries)) => entries.push(resume),
            _ => user.resumes = Some(Value::Array(vec![resume])),
        }
        user.updated_at = Utc::now();
        Ok(UpdateResult {
            matched: 1,
            modified: 1,
        })
    }

    async fn set_resumes(
        &self,
        user_id: &str,
        resumes: Vec<Value>,
    ) -> Result<UpdateResult, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(user) = inner.users.get_mut(user_id) else {
            return Ok(UpdateResult::default());
        };
        let replacement = Value::Array(resumes);
        if user.resumes.as_ref() == Some(&replacement) {
            return Ok(UpdateResult {
                matched: 1,
                modified: 0,
            });
        }
        user.resumes = Some(replacement);
        user.updated_at = Utc::now();
        Ok(UpdateResult {
            matched: 1,
            modified: 1,
        })
    }

    async fn set_api_key(
        &self,
        user_id: &str,
        api_key: Option<String>,
    ) -> Result<UpdateResult, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(user) = inner.users.get_mut(user_id) else {
            return Ok(UpdateResult::default());
        };
        user.api_key = api_key;
        Ok(UpdateResult {
            matched: 1,
            modified: 1,
        })
    }

    async fn insert_session(&self, session: SessionRecord) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .sessions
            .insert(session.token_hash.clone(), session);
        Ok(())
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.inner.read().await.sessions.get(token_hash).cloned())
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), StoreError> {
        self.inner.write().await.sessions.remove(token_hash);
        Ok(())
    }
}
