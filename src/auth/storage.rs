//! Persisted session records.
//!
//! Two JSON records under the application data directory: the serialized
//! user and the serialized token pair. Pure storage, no policy - write
//! ordering across the two records is the session layer's job.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{Credential, User};

/// User record file name in the data directory
const USER_FILE: &str = "user.json";

/// Credential record file name in the data directory
const CREDENTIAL_FILE: &str = "credential.json";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupted record: {0}")]
    Corrupted(#[from] serde_json::Error),
}

pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    /// Open (creating if needed) a store rooted at the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, StorageError> {
        let path = self.record_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(value)?;
        std::fs::write(self.record_path(name), contents)?;
        Ok(())
    }

    /// Remove a record; absent records are not an error.
    fn remove(&self, name: &str) -> Result<(), StorageError> {
        let path = self.record_path(name);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    // ===== User record =====

    pub fn save_user(&self, user: &User) -> Result<(), StorageError> {
        debug!(user_id = %user.id, "Persisting user record");
        self.save(USER_FILE, user)
    }

    pub fn get_user(&self) -> Result<Option<User>, StorageError> {
        self.load(USER_FILE)
    }

    pub fn remove_user(&self) -> Result<(), StorageError> {
        self.remove(USER_FILE)
    }

    // ===== Credential record =====

    pub fn save_credential(&self, credential: &Credential) -> Result<(), StorageError> {
        debug!("Persisting credential record");
        self.save(CREDENTIAL_FILE, credential)
    }

    pub fn get_credential(&self) -> Result<Option<Credential>, StorageError> {
        self.load(CREDENTIAL_FILE)
    }

    pub fn remove_credential(&self) -> Result<(), StorageError> {
        self.remove(CREDENTIAL_FILE)
    }

    /// Paired read of the persisted session.
    ///
    /// Returns `Some` only when both records are present; a user without
    /// a credential (or vice versa) reads as no session, so callers never
    /// observe a half-authenticated state.
    pub fn load_session(&self) -> Result<Option<(User, Credential)>, StorageError> {
        match (self.get_user()?, self.get_credential()?) {
            (Some(user), Some(credential)) => Ok(Some((user, credential))),
            _ => Ok(None),
        }
    }

    /// Directory this store persists into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "a@b.com".to_string(),
            avatar: None,
        }
    }

    fn sample_credential() -> Credential {
        Credential::new("t1".to_string(), Some("r1".to_string()))
    }

    #[test]
    fn test_user_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path()).unwrap();

        assert!(store.get_user().unwrap().is_none());

        store.save_user(&sample_user()).unwrap();
        assert_eq!(store.get_user().unwrap(), Some(sample_user()));

        // Overwrite reflects the most recent write.
        let renamed = User {
            name: "Ana Maria".to_string(),
            ..sample_user()
        };
        store.save_user(&renamed).unwrap();
        assert_eq!(store.get_user().unwrap(), Some(renamed));

        store.remove_user().unwrap();
        assert!(store.get_user().unwrap().is_none());
    }

    #[test]
    fn test_credential_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path()).unwrap();

        assert!(store.get_credential().unwrap().is_none());

        store.save_credential(&sample_credential()).unwrap();
        let loaded = store.get_credential().unwrap().unwrap();
        assert_eq!(loaded.token, "t1");
        assert_eq!(loaded.refresh_token.as_deref(), Some("r1"));

        store.remove_credential().unwrap();
        assert!(store.get_credential().unwrap().is_none());
    }

    #[test]
    fn test_removal_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path()).unwrap();

        store.remove_user().unwrap();
        store.remove_user().unwrap();
        store.remove_credential().unwrap();
        store.remove_credential().unwrap();
    }

    #[test]
    fn test_records_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path()).unwrap();

        store.save_user(&sample_user()).unwrap();
        store.save_credential(&sample_credential()).unwrap();
        store.remove_credential().unwrap();

        assert!(store.get_user().unwrap().is_some());
        assert!(store.get_credential().unwrap().is_none());
    }

    #[test]
    fn test_load_session_requires_both_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path()).unwrap();

        assert!(store.load_session().unwrap().is_none());

        store.save_user(&sample_user()).unwrap();
        assert!(store.load_session().unwrap().is_none());

        store.save_credential(&sample_credential()).unwrap();
        let (user, credential) = store.load_session().unwrap().unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(credential.token, "t1");

        store.remove_user().unwrap();
        assert!(store.load_session().unwrap().is_none());
    }

    #[test]
    fn test_corrupted_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path()).unwrap();

        std::fs::write(dir.path().join(USER_FILE), "not json").unwrap();
        assert!(matches!(
            store.get_user(),
            Err(StorageError::Corrupted(_))
        ));
    }
}
