//! Per-user search quotas for the chat bot.
//!
//! Every user conceptually starts with `free_searches` (5) and no premium.
//! A record is only written on first use or on a premium grant; reads never
//! persist anything.
//!
//! All mutations are a read-modify-write against the backend. [`QuotaStore`]
//! holds one lock per user id for the duration of that cycle, so overlapping
//! requests from the same user cannot lose an update. Requests from different
//! users only meet inside the backend.

mod backend;
mod file;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{LookupError, StorageError};

pub use backend::{MemoryBackend, QuotaBackend};
pub use file::JsonFileBackend;

/// Counters for one user. Field names match the on-disk `users.json` layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRecord {
    #[serde(rename = "searches")]
    pub searches_used: u64,
    #[serde(rename = "isPremium")]
    pub is_premium: bool,
    /// Not floored: usage always decrements. Callers check [`Self::has_remaining`] first.
    #[serde(rename = "remainingSearches")]
    pub remaining_searches: i64,
}

impl QuotaRecord {
    pub fn new_free(free_searches: i64) -> Self {
        Self {
            searches_used: 0,
            is_premium: false,
            remaining_searches: free_searches,
        }
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining_searches > 0
    }
}

impl Default for QuotaRecord {
    fn default() -> Self {
        Self::new_free(QuotaPolicy::default().free_searches)
    }
}

/// Allowance numbers (optional `[quota]` section in config.toml).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaPolicy {
    /// Searches a user gets before any grant.
    pub free_searches: i64,
    /// Searches a premium grant sets when no explicit count is given.
    pub premium_searches: i64,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            free_searches: 5,
            premium_searches: 50,
        }
    }
}

pub struct QuotaStore<B> {
    backend: B,
    policy: QuotaPolicy,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<B: QuotaBackend> QuotaStore<B> {
    pub fn new(backend: B, policy: QuotaPolicy) -> Self {
        Self {
            backend,
            policy,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> QuotaPolicy {
        self.policy
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn default_record(&self) -> QuotaRecord {
        QuotaRecord::new_free(self.policy.free_searches)
    }

    /// Stored record, or the default one for a user never seen before.
    pub fn get_quota(&self, user_id: &str) -> Result<QuotaRecord, StorageError> {
        Ok(self
            .backend
            .get(user_id)?
            .unwrap_or_else(|| self.default_record()))
    }

    /// Current record if the user still has a search left.
    pub fn ensure_remaining(&self, user_id: &str) -> Result<QuotaRecord, LookupError> {
        let rec = self.get_quota(user_id)?;
        if rec.has_remaining() {
            Ok(rec)
        } else {
            Err(LookupError::QuotaExhausted {
                remaining: rec.remaining_searches,
            })
        }
    }

    /// Count one search: `searches_used + 1`, `remaining_searches - 1`.
    ///
    /// No floor is applied; check [`QuotaRecord::has_remaining`] before the
    /// lookup that this call pays for.
    pub fn record_usage(&self, user_id: &str) -> Result<QuotaRecord, StorageError> {
        self.update(user_id, |current| {
            let mut rec = current.unwrap_or_else(|| self.default_record());
            rec.searches_used = rec.searches_used.saturating_add(1);
            rec.remaining_searches = rec.remaining_searches.saturating_sub(1);
            Some(rec)
        })
        .map(|rec| rec.unwrap_or_else(|| self.default_record()))
    }

    /// Replace the record with a fresh premium allowance, dropping usage history.
    pub fn grant_premium(&self, user_id: &str, granted: i64) -> Result<QuotaRecord, StorageError> {
        let rec = QuotaRecord {
            searches_used: 0,
            is_premium: true,
            remaining_searches: granted,
        };
        self.update(user_id, |_| Some(rec.clone()))?;
        tracing::info!(user = user_id, granted, "premium granted");
        Ok(rec)
    }

    /// Grant with the configured default allowance.
    pub fn grant_default_premium(&self, user_id: &str) -> Result<QuotaRecord, StorageError> {
        self.grant_premium(user_id, self.policy.premium_searches)
    }

    /// Clear premium and remaining searches. Unknown users are left untouched.
    pub fn revoke_premium(&self, user_id: &str) -> Result<(), StorageError> {
        let changed = self.update(user_id, |current| {
            current.map(|mut rec| {
                rec.is_premium = false;
                rec.remaining_searches = 0;
                rec
            })
        })?;
        if changed.is_some() {
            tracing::info!(user = user_id, "premium revoked");
        }
        Ok(())
    }

    /// Run `f` on the current record under the user's lock. `Some` is written
    /// back and returned; `None` writes nothing.
    fn update<F>(&self, user_id: &str, f: F) -> Result<Option<QuotaRecord>, StorageError>
    where
        F: FnOnce(Option<QuotaRecord>) -> Option<QuotaRecord>,
    {
        let key_lock = self.key_lock(user_id)?;
        let result = (|| -> Result<Option<QuotaRecord>, StorageError> {
            let _guard = key_lock.lock().map_err(|_| StorageError::Poisoned)?;
            let mut f = Some(f);
            let mut apply = |current: Option<QuotaRecord>| f.take().and_then(|f| f(current));
            self.backend.update(user_id, &mut apply)
        })();
        self.release_key(user_id, key_lock);
        result
    }

    fn key_lock(&self, user_id: &str) -> Result<Arc<Mutex<()>>, StorageError> {
        let mut locks = self.locks.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(Arc::clone(
            locks
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        ))
    }

    /// Drop the per-user lock once nobody else holds or waits on it.
    fn release_key(&self, user_id: &str, key_lock: Arc<Mutex<()>>) {
        if let Ok(mut locks) = self.locks.lock() {
            // One reference in the map plus ours.
            if Arc::strong_count(&key_lock) == 2 {
                locks.remove(user_id);
            }
        }
    }
}

#[cfg(test)]
mod tests;
