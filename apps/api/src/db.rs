//! Record store accessor: builds the one connection pool the process shares.
//!
//! The pool is created by `main` and handed to the store through `AppState`;
//! nothing in the crate holds a global connection.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

pub const MAX_CONNECTIONS: u32 = 10;
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// Applied server-side as `statement_timeout`.
pub const SOCKET_TIMEOUT: Duration = Duration::from_secs(45);
pub const POOL_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            TEXT PRIMARY KEY,
        email         TEXT NOT NULL UNIQUE,
        name          TEXT,
        image         TEXT,
        password_hash TEXT,
        api_key       TEXT,
        resumes       JSONB DEFAULT '[]'::jsonb,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        token_hash TEXT PRIMARY KEY,
        user_id    TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        expires_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS sessions_user_id_idx ON sessions (user_id)",
];

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("database connection string (DATABASE_URL) is not configured")]
    MissingUrl,

    #[error("database name (DATABASE_NAME) is not configured")]
    MissingDatabaseName,

    #[error("invalid database connection string: {0}")]
    InvalidUrl(#[source] sqlx::Error),

    #[error("timed out after {0:?} connecting to the database")]
    Timeout(Duration),

    #[error("failed to connect to the database: {0}")]
    Connect(#[source] sqlx::Error),
}

/// Connection inputs, taken from process configuration.
#[derive(Debug, Clone, Default)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub name: Option<String>,
}

/// Creates the PostgreSQL connection pool bound to the configured database.
///
/// Fails fast: a missing setting, a refused connection or a connect attempt
/// that exceeds `CONNECT_TIMEOUT` is returned to the caller, never retried.
pub async fn create_pool(settings: &DatabaseSettings) -> Result<PgPool, ConnectionError> {
    let url = settings
        .url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .ok_or(ConnectionError::MissingUrl)?;
    let name = settings
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .ok_or(ConnectionError::MissingDatabaseName)?;

    let options = PgConnectOptions::from_str(url)
        .map_err(ConnectionError::InvalidUrl)?
        .database(name)
        .options([("statement_timeout", SOCKET_TIMEOUT.as_millis().to_string())]);

    info!("Connecting to PostgreSQL database '{name}'...");

    let connect = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(POOL_WAIT_TIMEOUT)
        .connect_with(options);

    let pool = tokio::time::timeout(CONNECT_TIMEOUT, connect)
        .await
        .map_err(|_| ConnectionError::Timeout(CONNECT_TIMEOUT))?
        .map_err(ConnectionError::Connect)?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the `users` and `sessions` tables when they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_url_is_connection_error() {
        let settings = DatabaseSettings {
            url: None,
            name: Some("resumes".to_string()),
        };
        let err = create_pool(&settings).await.unwrap_err();
        assert!(matches!(err, ConnectionError::MissingUrl));
    }

    #[tokio::test]
    async fn test_blank_database_name_is_connection_error() {
        let settings = DatabaseSettings {
            url: Some("postgres://localhost/postgres".to_string()),
            name: Some("  ".to_string()),
        };
        let err = create_pool(&settings).await.unwrap_err();
        assert!(matches!(err, ConnectionError::MissingDatabaseName));
    }

    #[tokio::test]
    async fn test_unparsable_url_is_rejected_before_connecting() {
        let settings = DatabaseSettings {
            url: Some("definitely not a url".to_string()),
            name: Some("resumes".to_string()),
        };
        let err = create_pool(&settings).await.unwrap_err();
        assert!(matches!(err, ConnectionError::InvalidUrl(_)));
    }
}
