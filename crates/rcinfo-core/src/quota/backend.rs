//! Storage capability behind the quota store: get/put keyed by user id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::StorageError;

use super::QuotaRecord;

/// Key-value persistence for quota records.
///
/// `put` must not disturb other users' records. Serializing read-modify-write
/// for a single user within one process is the caller's job
/// ([`super::QuotaStore`]); backends shared between processes override
/// [`QuotaBackend::update`] to make it atomic on their side too.
pub trait QuotaBackend: Send + Sync {
    fn get(&self, user_id: &str) -> Result<Option<QuotaRecord>, StorageError>;
    fn put(&self, user_id: &str, record: &QuotaRecord) -> Result<(), StorageError>;

    /// Apply `f` to the current record; `Some` is stored, `None` writes nothing.
    fn update(
        &self,
        user_id: &str,
        f: &mut dyn FnMut(Option<QuotaRecord>) -> Option<QuotaRecord>,
    ) -> Result<Option<QuotaRecord>, StorageError> {
        match f(self.get(user_id)?) {
            Some(next) => {
                self.put(user_id, &next)?;
                Ok(Some(next))
            }
            None => Ok(None),
        }
    }
}

impl<T: QuotaBackend + ?Sized> QuotaBackend for Arc<T> {
    fn get(&self, user_id: &str) -> Result<Option<QuotaRecord>, StorageError> {
        (**self).get(user_id)
    }

    fn put(&self, user_id: &str, record: &QuotaRecord) -> Result<(), StorageError> {
        (**self).put(user_id, record)
    }

    fn update(
        &self,
        user_id: &str,
        f: &mut dyn FnMut(Option<QuotaRecord>) -> Option<QuotaRecord>,
    ) -> Result<Option<QuotaRecord>, StorageError> {
        (**self).update(user_id, f)
    }
}

/// Process-local backend. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    users: Mutex<HashMap<String, QuotaRecord>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.lock().map(|u| u.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QuotaBackend for MemoryBackend {
    fn get(&self, user_id: &str) -> Result<Option<QuotaRecord>, StorageError> {
        let users = self.users.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(users.get(user_id).cloned())
    }

    fn put(&self, user_id: &str, record: &QuotaRecord) -> Result<(), StorageError> {
        let mut users = self.users.lock().map_err(|_| StorageError::Poisoned)?;
        users.insert(user_id.to_string(), record.clone());
        Ok(())
    }
}
