use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_PREVIEW_DIR: &str = "public/templates/previews";
const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 30;
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Application configuration loaded from environment variables.
///
/// Database settings are kept optional here; `db::create_pool` is the one
/// place that rejects a missing connection string or database name.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    /// Server-wide AI provider key. Users may store their own in settings.
    pub anthropic_api_key: Option<String>,
    pub preview_dir: PathBuf,
    pub session_ttl_hours: i64,
    /// Accept `Authorization: Bearer <user id>` without a session.
    /// Off unless explicitly enabled; the token is not verified in that mode.
    pub allow_legacy_bearer: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            database_name: optional_env("DATABASE_NAME"),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            preview_dir: optional_env("PREVIEW_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PREVIEW_DIR)),
            session_ttl_hours: match optional_env("SESSION_TTL_HOURS") {
                Some(raw) => parse_session_ttl(&raw)?,
                None => DEFAULT_SESSION_TTL_HOURS,
            },
            allow_legacy_bearer: optional_env("ALLOW_LEGACY_BEARER")
                .map(|raw| parse_flag(&raw))
                .transpose()
                .context("ALLOW_LEGACY_BEARER must be true or false")?
                .unwrap_or(false),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Returns the variable's value, treating unset and blank the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unrecognised flag value '{other}'"),
    }
}

/// Whole hours, at least one and at most a year.
fn parse_session_ttl(raw: &str) -> Result<i64> {
    let hours = raw
        .parse::<i64>()
        .context("SESSION_TTL_HOURS must be a whole number of hours")?;
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        anyhow::bail!("SESSION_TTL_HOURS must be between 1 and {MAX_SESSION_TTL_HOURS}, got {hours}");
    }
    Ok(hours)
}
