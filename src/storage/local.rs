//! Local filesystem storage implementation.
//!
//! Keeps every session in a single `sessions.json` under the data directory,
//! written atomically (write to temp, then rename). Used by the CLI and
//! tests; production deployments use DynamoStore.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{NewStudySession, StudySession};
use crate::storage::SessionStore;

const SESSIONS_FILE: &str = "sessions.json";

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStore {
    root_dir: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn sessions_path(&self) -> PathBuf {
        self.root_dir.join(SESSIONS_FILE)
    }

    /// Load every stored session. A missing file reads as empty.
    pub async fn load_all(&self) -> Result<Vec<StudySession>> {
        match tokio::fs::read(self.sessions_path()).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write all sessions atomically (write to temp, then rename).
    async fn write_all(&self, sessions: &[StudySession]) -> Result<()> {
        let path = self.sessions_path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(sessions)?;
        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for LocalStore {
    async fn exists_by_url(&self, url: &str) -> Result<bool> {
        let sessions = self
            .load_all()
            .await
            .map_err(|e| AppError::storage("check_exists", e))?;
        Ok(sessions.iter().any(|s| s.url == url))
    }

    async fn create(&self, new_session: NewStudySession) -> Result<StudySession> {
        let mut sessions = self
            .load_all()
            .await
            .map_err(|e| AppError::storage("create", e))?;

        let session = new_session.into_session();
        sessions.push(session.clone());

        self.write_all(&sessions)
            .await
            .map_err(|e| AppError::storage("create", e))?;

        log::info!("Stored study session {} ({})", session.id, session.url);
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use tempfile::TempDir;

    use super::*;
    use crate::models::SessionStatus;

    fn sample_new_session(url: &str) -> NewStudySession {
        NewStudySession {
            title: "テスト勉強会".to_string(),
            url: url.to_string(),
            datetime: DateTime::parse_from_rfc3339("2026-03-14T19:00:00+09:00").unwrap(),
            end_datetime: None,
        }
    }

    #[tokio::test]
    async fn create_then_exists_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        let url = "https://connpass.com/event/1/";
        let session = store.create(sample_new_session(url)).await.unwrap();

        assert_eq!(session.status, SessionStatus::Pending);
        assert!(store.exists_by_url(url).await.unwrap());
        assert!(
            !store
                .exists_by_url("https://connpass.com/event/2/")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn exists_on_missing_file_is_false() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        assert!(
            !store
                .exists_by_url("https://connpass.com/event/1/")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn load_all_preserves_insertion_order() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        let first = store
            .create(sample_new_session("https://connpass.com/event/1/"))
            .await
            .unwrap();
        let second = store
            .create(sample_new_session("https://connpass.com/event/2/"))
            .await
            .unwrap();

        let all = store.load_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[1].id, second.id);
    }

    #[tokio::test]
    async fn write_leaves_no_temp_file_behind() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        store
            .create(sample_new_session("https://connpass.com/event/1/"))
            .await
            .unwrap();

        assert!(tmp.path().join("sessions.json").exists());
        assert!(!tmp.path().join("sessions.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_file_surfaces_storage_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("sessions.json"), b"not json").unwrap();
        let store = LocalStore::new(tmp.path());

        let err = store
            .exists_by_url("https://connpass.com/event/1/")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage { ref operation, .. } if operation == "check_exists"));
    }
}
