use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;

use crate::models::user::{NewUser, SessionRecord, UserDocument};
use crate::store::{StoreError, UpdateResult, UserStore};

/// `UserStore` over PostgreSQL. The `resumes` array lives in a JSONB column,
/// so every array write is a single-row UPDATE.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_user(&self, user_id: &str) -> Result<Option<UserDocument>, StoreError> {
        Ok(
            sqlx::query_as::<_, UserDocument>("SELECT * FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserDocument>, StoreError> {
        Ok(
            sqlx::query_as::<_, UserDocument>("SELECT * FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserDocument, StoreError> {
        let inserted = sqlx::query_as::<_, UserDocument>(
            r#"
            INSERT INTO users (id, email, name, image, password_hash, resumes)
            VALUES ($1, $2, $3, $4, $5, '[]'::jsonb)
            RETURNING *
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.image)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(row) => Ok(row),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::DuplicateEmail(user.email))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn push_resume(&self, user_id: &str, resume: Value) -> Result<UpdateResult, StoreError> {
        // A missing or non-array field is treated as empty before appending.
        let result = sqlx::query(
            r#"
            UPDATE users
            SET resumes = CASE
                    WHEN jsonb_typeof(resumes) = 'array' THEN resumes
                    ELSE '[]'::jsonb
                END || jsonb_build_array($2::jsonb),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(resume)
        .execute(&self.pool)
        .await?;

        let affected = result.rows_affected();
        Ok(UpdateResult {
            matched: affected,
            modified: affected,
        })
    }

    async fn set_resumes(
        &self,
        user_id: &str,
        resumes: Vec<Value>,
    ) -> Result<UpdateResult, StoreError> {
        // Reports matched and modified separately: writing an identical array
        // matches the user but modifies nothing.
        let (matched, modified): (i64, i64) = sqlx::query_as(
            r#"
            WITH target AS (
                SELECT id, resumes FROM users WHERE id = $1 FOR UPDATE
            ),
            updated AS (
                UPDATE users u
                SET resumes = $2, updated_at = now()
                FROM target t
                WHERE u.id = t.id AND t.resumes IS DISTINCT FROM $2
                RETURNING u.id
            )
            SELECT (SELECT COUNT(*) FROM target), (SELECT COUNT(*) FROM updated)
            "#,
        )
        .bind(user_id)
        .bind(Value::Array(resumes))
        .fetch_one(&self.pool)
        .await?;

        debug!("set_resumes for user {user_id}: matched={matched} modified={modified}");

        Ok(UpdateResult {
            matched: matched as u64,
            modified: modified as u64,
        })
    }

    async fn set_api_key(
        &self,
        user_id: &str,
        api_key: Option<String>,
    ) -> Result<UpdateResult, StoreError> {
        let result =
            sqlx::query("UPDATE users SET api_key = $2, updated_at = now() WHERE id = $1")
                .bind(user_id)
                .bind(api_key)
                .execute(&self.pool)
                .await?;

        let affected = result.rows_affected();
        Ok(UpdateResult {
            matched: affected,
            modified: affected,
        })
    }

    async fn insert_session(&self, session: SessionRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&session.token_hash)
        .bind(&session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<SessionRecord>, StoreError> {
        Ok(
            sqlx::query_as::<_, SessionRecord>("SELECT * FROM sessions WHERE token_hash = $1")
                .bind(token_hash)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn delete_session(&self, token_hash: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
