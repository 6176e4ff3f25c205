//! File-backed preview cache.
//!
//! Files are named `{resumeId}-{templateName}-{unixMillis}-{suffix}.png` in a
//! single directory. Lookups pick the newest file by modification time.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use rand_core::{OsRng, RngCore};
use thiserror::Error;
use tracing::{debug, info, warn};

/// URL path the preview directory is served under.
pub const PUBLIC_PREFIX: &str = "/templates/previews";

/// Request body cap for preview uploads. Full-page PNG data URLs run well
/// past axum's 2 MiB default.
pub const PREVIEW_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

const EXTENSION: &str = ".png";
const SUFFIX_LEN: usize = 8;
const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("invalid {field}: {value:?}")]
    InvalidKey { field: &'static str, value: String },

    #[error("preview image is not valid base64 image data")]
    InvalidImage,

    #[error("preview storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct PreviewStore {
    dir: PathBuf,
}

impl PreviewStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Public URL of the newest preview for this resume and template, if any.
    pub async fn find_latest(
        &self,
        resume_id: &str,
        template_name: &str,
    ) -> Result<Option<String>, PreviewError> {
        validate_key("resumeId", resume_id)?;
        validate_key("templateName", template_name)?;

        let prefix = format!("{resume_id}-{template_name}-");
        let newest = self
            .matching_files(&prefix)
            .await?
            .into_iter()
            .max_by(|(a_name, a_time), (b_name, b_time)| {
                a_time.cmp(b_time).then_with(|| a_name.cmp(b_name))
            });

        Ok(newest.map(|(name, _)| public_url(&name)))
    }

    /// Decodes a base64 data URL and writes it as a new preview file.
    pub async fn save(
        &self,
        resume_id: &str,
        template_name: &str,
        data_url: &str,
    ) -> Result<String, PreviewError> {
        validate_key("resumeId", resume_id)?;
        validate_key("templateName", template_name)?;
        let bytes = decode_data_url(data_url)?;

        tokio::fs::create_dir_all(&self.dir).await?;

        let millis = chrono::Utc::now().timestamp_millis();
        let file_name = format!(
            "{resume_id}-{template_name}-{millis}-{}{EXTENSION}",
            random_suffix()
        );
        tokio::fs::write(self.dir.join(&file_name), &bytes).await?;

        info!("Saved preview {file_name} ({} bytes)", bytes.len());
        Ok(public_url(&file_name))
    }

    /// Deletes every preview of a resume, across all templates.
    pub async fn delete_for_resume(&self, resume_id: &str) -> Result<usize, PreviewError> {
        validate_key("resumeId", resume_id)?;

        let prefix = format!("{resume_id}-");
        let mut deleted = 0;
        for (name, _) in self.matching_files(&prefix).await? {
            tokio::fs::remove_file(self.dir.join(&name)).await?;
            deleted += 1;
        }

        debug!("Deleted {deleted} preview(s) for resume {resume_id}");
        Ok(deleted)
    }

    /// Best-effort cleanup after a resume changes: failures are logged only.
    pub async fn discard_for_resume(&self, resume_id: &str) {
        if let Err(e) = self.delete_for_resume(resume_id).await {
            warn!("Failed to delete previews for resume {resume_id}: {e}");
        }
    }

    /// `(file name, modified time)` of every `.png` starting with `prefix`.
    /// A missing directory has no files.
    async fn matching_files(&self, prefix: &str) -> Result<Vec<(String, SystemTime)>, PreviewError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut matches = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !name.starts_with(prefix) || !name.ends_with(EXTENSION) {
                continue;
            }
            let modified = entry.metadata().await?.modified()?;
            matches.push((name, modified));
        }
        Ok(matches)
    }
}

pub fn public_url(file_name: &str) -> String {
    format!("{PUBLIC_PREFIX}/{file_name}")
}

/// Keys become part of a file name, so anything that could escape the
/// preview directory is rejected.
fn validate_key(field: &'static str, value: &str) -> Result<(), PreviewError> {
    let invalid = value.is_empty()
        || value.contains(['/', '\\', '\0'])
        || value.contains("..");
    if invalid {
        return Err(PreviewError::InvalidKey {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Accepts `data:image/<kind>;base64,<payload>` or a bare base64 payload.
fn decode_data_url(data_url: &str) -> Result<Vec<u8>, PreviewError> {
    let payload = match data_url.strip_prefix("data:image/") {
        Some(rest) => {
            let (kind, payload) = rest
                .split_once(";base64,")
                .ok_or(PreviewError::InvalidImage)?;
            if kind.is_empty() || !kind.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(PreviewError::InvalidImage);
            }
            payload
        }
        None => data_url,
    };

    let bytes = B64
        .decode(payload.trim())
        .map_err(|_| PreviewError::InvalidImage)?;
    if bytes.is_empty() {
        return Err(PreviewError::InvalidImage);
    }
    Ok(bytes)
}

fn random_suffix() -> String {
    let mut bytes = [0u8; SUFFIX_LEN];
    OsRng.fill_bytes(&mut bytes);
    bytes
        .iter()
        .map(|b| SUFFIX_ALPHABET[*b as usize % SUFFIX_ALPHABET.len()] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn touch(dir: &Path, name: &str, modified: SystemTime) {
        let path = dir.join(name);
        std::fs::write(&path, b"png").unwrap();
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
    }

    #[tokio::test]
    async fn test_find_latest_picks_newest_by_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        touch(dir.path(), "abc-modern-100-x.png", base);
        touch(dir.path(), "abc-modern-200-y.png", base + Duration::from_secs(60));
        touch(dir.path(), "abc-classic-300-z.png", base + Duration::from_secs(120));

        let store = PreviewStore::new(dir.path());
        let url = store.find_latest("abc", "modern").await.unwrap();
        assert_eq!(url.as_deref(), Some("/templates/previews/abc-modern-200-y.png"));
    }

    #[tokio::test]
    async fn test_find_latest_uses_mtime_not_name() {
        let dir = tempfile::tempdir().unwrap();
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        touch(dir.path(), "abc-modern-900-a.png", base);
        touch(dir.path(), "abc-modern-100-b.png", base + Duration::from_secs(5));

        let store = PreviewStore::new(dir.path());
        let url = store.find_latest("abc", "modern").await.unwrap();
        assert_eq!(url.as_deref(), Some("/templates/previews/abc-modern-100-b.png"));
    }

    #[tokio::test]
    async fn test_find_latest_without_directory_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreviewStore::new(dir.path().join("missing"));
        assert_eq!(store.find_latest("abc", "modern").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_latest_ignores_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("abc-modern-100-x.jpg"), b"jpg").unwrap();
        let store = PreviewStore::new(dir.path());
        assert_eq!(store.find_latest("abc", "modern").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_writes_named_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreviewStore::new(dir.path().join("previews"));
        let data_url = format!("data:image/png;base64,{}", B64.encode(b"\x89PNG fake"));

        let url = store.save("abc", "modern", &data_url).await.unwrap();
        let file_name = url.strip_prefix("/templates/previews/").unwrap();

        let parts: Vec<&str> = file_name.trim_end_matches(".png").split('-').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "abc");
        assert_eq!(parts[1], "modern");
        assert!(parts[2].parse::<i64>().is_ok());
        assert_eq!(parts[3].len(), SUFFIX_LEN);

        let written = std::fs::read(store.dir().join(file_name)).unwrap();
        assert_eq!(written, b"\x89PNG fake");
        assert_eq!(store.find_latest("abc", "modern").await.unwrap(), Some(url));
    }

    #[tokio::test]
    async fn test_save_rejects_garbage_image() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreviewStore::new(dir.path());
        let err = store
            .save("abc", "modern", "data:image/png;base64,***")
            .await
            .unwrap_err();
        assert!(matches!(err, PreviewError::InvalidImage));
    }

    #[tokio::test]
    async fn test_keys_cannot_escape_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreviewStore::new(dir.path());
        let err = store.find_latest("../etc", "modern").await.unwrap_err();
        assert!(matches!(err, PreviewError::InvalidKey { field: "resumeId", .. }));
        let err = store.delete_for_resume("a/b").await.unwrap_err();
        assert!(matches!(err, PreviewError::InvalidKey { .. }));
    }

    #[tokio::test]
    async fn test_delete_for_resume_only_touches_that_resume() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        touch(dir.path(), "abc-modern-1-a.png", now);
        touch(dir.path(), "abc-classic-2-b.png", now);
        touch(dir.path(), "abd-modern-3-c.png", now);
        std::fs::write(dir.path().join("abc-notes.txt"), b"keep").unwrap();

        let store = PreviewStore::new(dir.path());
        assert_eq!(store.delete_for_resume("abc").await.unwrap(), 2);
        assert!(dir.path().join("abd-modern-3-c.png").exists());
        assert!(dir.path().join("abc-notes.txt").exists());
    }

    #[tokio::test]
    async fn test_delete_without_directory_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreviewStore::new(dir.path().join("missing"));
        assert_eq!(store.delete_for_resume("abc").await.unwrap(), 0);
    }

    #[test]
    fn test_decode_accepts_bare_base64() {
        let encoded = B64.encode(b"hello");
        assert_eq!(decode_data_url(&encoded).unwrap(), b"hello");
    }

    #[test]
    fn test_decode_rejects_unknown_data_url_shape() {
        assert!(matches!(
            decode_data_url("data:image/png,notbase64"),
            Err(PreviewError::InvalidImage)
        ));
    }

    #[test]
    fn test_random_suffix_alphabet() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| SUFFIX_ALPHABET.contains(&b)));
    }
}
