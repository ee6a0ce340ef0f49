//! User records and the storage backends holding them.
//!
//! The store has no partial-update capability: every mutation loads the full
//! user set, rewrites it in memory and saves the whole collection back.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{fs, sync::Mutex};

/// A single account as persisted on disk. `username` is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub hashed_password: String,
}

/// On-disk layout: `{"users": [...]}`.
#[derive(Debug, Serialize, Deserialize)]
struct UserFile {
    users: Vec<UserRecord>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user store unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("user store malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Storage backend for the full user set.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// Fully overwrites storage with `users`.
    async fn save_all(&self, users: &[UserRecord]) -> Result<(), StoreError>;
}

pub fn find_by_username<'a>(users: &'a [UserRecord], username: &str) -> Option<&'a UserRecord> {
    users.iter().find(|u| u.username == username)
}

/// Flat-file implementation of [`UserStore`] over a single JSON file.
#[derive(Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl UserStore for FileStore {
    async fn load_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        let raw = fs::read_to_string(&self.path).await?;
        let file: UserFile = serde_json::from_str(&raw)?;
        Ok(file.users)
    }

    /// Whole-file overwrite. Not atomic: a failure mid-write can leave the
    /// file truncated.
    async fn save_all(&self, users: &[UserRecord]) -> Result<(), StoreError> {
        let file = UserFile {
            users: users.to_vec(),
        };
        let raw = serde_json::to_string_pretty(&file)?;
        fs::write(&self.path, raw).await?;
        Ok(())
    }
}

/// In-memory implementation used by tests in place of the file store.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn load_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self.users.lock().await.clone())
    }

    async fn save_all(&self, users: &[UserRecord]) -> Result<(), StoreError> {
        *self.users.lock().await = users.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(username: &str) -> UserRecord {
        UserRecord {
            username: username.into(),
            hashed_password: format!("$argon2id$fake-hash-for-{username}"),
        }
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("users.json"));

        let users = vec![record("alice"), record("bob")];
        store.save_all(&users).await.expect("save");
        let loaded = store.load_all().await.expect("load");
        assert_eq!(loaded, users);
    }

    #[tokio::test]
    async fn load_fails_when_file_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("missing.json"));

        let err = store.load_all().await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[tokio::test]
    async fn load_fails_on_malformed_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("users.json");
        tokio::fs::write(&path, "not json at all").await.expect("write");

        let err = FileStore::new(&path).load_all().await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[tokio::test]
    async fn save_replaces_previous_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("users.json"));

        store.save_all(&[record("alice")]).await.expect("save");
        store.save_all(&[record("bob")]).await.expect("save again");

        let loaded = store.load_all().await.expect("load");
        assert_eq!(loaded, vec![record("bob")]);
    }

    #[test]
    fn find_by_username_hit_and_miss() {
        let users = vec![record("alice"), record("bob")];
        assert_eq!(find_by_username(&users, "bob"), Some(&users[1]));
        assert_eq!(find_by_username(&users, "carol"), None);
    }
}
