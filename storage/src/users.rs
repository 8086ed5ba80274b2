use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::StorageError;

/// One registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Account identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Unique contact address.
    pub email: String,
    /// Salted password digest, hex-encoded.
    pub password_hash: String,
    /// Per-user salt, hex-encoded.
    pub salt: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// The account registry, persisted as one JSON document.
///
/// Mutations rewrite the document through a temp file and rename, so a
/// crash mid-write never leaves a truncated registry behind.
#[derive(Debug)]
pub struct UserStore {
    path: PathBuf,
    users: RwLock<Vec<UserRecord>>,
}

impl UserStore {
    /// Opens the registry, creating an empty one if the file is
    /// missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let users = if path.exists() {
            serde_json::from_slice(&fs::read(&path)?)?
        } else {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            Vec::new()
        };
        Ok(Self {
            path,
            users: RwLock::new(users),
        })
    }

    /// Registers an account; rejects a duplicate username or email.
    pub fn insert(&self, record: UserRecord) -> Result<(), StorageError> {
        let mut users = self.users.write();
        let collision = users
            .iter()
            .any(|user| user.username == record.username || user.email == record.email);
        if collision {
            return Err(StorageError::DuplicateUser);
        }
        users.push(record);
        self.persist(&users)
    }

    /// Looks an account up by login name.
    #[must_use]
    pub fn find_by_username(&self, username: &str) -> Option<UserRecord> {
        self.users
            .read()
            .iter()
            .find(|user| user.username == username)
            .cloned()
    }

    /// Looks an account up by id.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<UserRecord> {
        self.users.read().iter().find(|user| user.id == id).cloned()
    }

    /// Number of registered accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }

    fn persist(&self, users: &[UserRecord]) -> Result<(), StorageError> {
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, serde_json::to_vec_pretty(users)?)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(username: &str, email: &str) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            username: username.to_owned(),
            email: email.to_owned(),
            password_hash: "digest".to_owned(),
            salt: "salt".to_owned(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn inserts_and_survives_a_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        let store = UserStore::open(&path).unwrap();
        let alice = record("alice", "alice@example.net");
        store.insert(alice.clone()).unwrap();
        store.insert(record("bob", "bob@example.net")).unwrap();
        assert_eq!(store.len(), 2);

        let reopened = UserStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        let found = reopened.find_by_username("alice").unwrap();
        assert_eq!(found.id, alice.id);
        assert_eq!(reopened.get(alice.id).unwrap().email, "alice@example.net");
    }

    #[test]
    fn duplicate_username_or_email_is_rejected() {
        let dir = tempdir().unwrap();
        let store = UserStore::open(dir.path().join("users.json")).unwrap();
        store.insert(record("alice", "alice@example.net")).unwrap();
        assert!(matches!(
            store.insert(record("alice", "other@example.net")),
            Err(StorageError::DuplicateUser)
        ));
        assert!(matches!(
            store.insert(record("other", "alice@example.net")),
            Err(StorageError::DuplicateUser)
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempdir().unwrap();
        let store = UserStore::open(dir.path().join("nested/users.json")).unwrap();
        assert!(store.is_empty());
        assert!(store.find_by_username("nobody").is_none());
    }
}
