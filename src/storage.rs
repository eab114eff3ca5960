use sled::Db;
use std::path::Path;

use crate::error::StoreError;
use crate::models::User;

/// Persistence boundary for accounts.
///
/// `create_user` must be an atomic check-then-insert: two concurrent
/// creations of the same username leave exactly one record, and the loser
/// gets [`StoreError::AlreadyExists`].
pub trait CredentialStore: Send + Sync {
    fn find_user(&self, username: &str) -> Result<Option<User>, StoreError>;
    fn create_user(&self, user: &User) -> Result<(), StoreError>;
    /// Returns whether a record was removed.
    fn delete_user(&self, username: &str) -> Result<bool, StoreError>;
    /// Cheap round trip proving the backend answers reads.
    fn ping(&self) -> Result<(), StoreError>;
}

/// Sled-backed credential store: one tree, keyed by username, holding JSON
/// encoded [`User`] records.
#[derive(Clone)] // sled handles are reference counted; a clone is a new handle on the same db
pub struct Storage {
    db: Db,
    users: sled::Tree,
}

impl Storage {
    /// Open or create the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::from_db(sled::open(path)?)
    }

    /// Throwaway database removed on drop, for tests and dry runs.
    pub fn temporary() -> Result<Self, StoreError> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: Db) -> Result<Self, StoreError> {
        let users = db.open_tree("users")?;
        Ok(Self { db, users })
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}

impl CredentialStore for Storage {
    fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        match self.users.get(username.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let record = serde_json::to_vec(user)?;
        // CAS from "absent" is the uniqueness constraint
        self.users
            .compare_and_swap(user.username.as_bytes(), None as Option<&[u8]>, Some(record))?
            .map_err(|_| StoreError::AlreadyExists(user.username.clone()))
    }

    fn delete_user(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.users.remove(username.as_bytes())?.is_some())
    }

    fn ping(&self) -> Result<(), StoreError> {
        self.users.first()?;
        Ok(())
    }
}
