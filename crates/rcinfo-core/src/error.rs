//! Error kinds surfaced to the web form and the chat bot.

use std::path::PathBuf;

use thiserror::Error;

/// Message used when the upstream API fails without saying why.
pub const DEFAULT_UPSTREAM_MESSAGE: &str = "Failed to fetch vehicle details";

/// Quota file could not be read, parsed or written.
///
/// Kept separate from [`LookupError::QuotaExhausted`]: a broken store must never
/// look like a user who simply ran out of searches.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("read quota store {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse quota store {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("write quota store {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lock quota store {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("quota store lock poisoned")]
    Poisoned,
}

/// Failure of a single lookup request, in whichever front-end issued it.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Input is not a registration number.
    #[error("invalid registration number: {0:?}")]
    Validation(String),

    /// Upstream API reported failure or could not be reached. The message is
    /// shown to the end user as-is.
    #[error("{0}")]
    Upstream(String),

    /// User has no searches left.
    #[error("no searches remaining ({remaining})")]
    QuotaExhausted { remaining: i64 },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LookupError {
    pub fn upstream(message: impl Into<String>) -> Self {
        LookupError::Upstream(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_is_shown_verbatim() {
        let e = LookupError::upstream("Vehicle not found");
        assert_eq!(e.to_string(), "Vehicle not found");
    }

    #[test]
    fn storage_error_mentions_path() {
        let e = StorageError::Read {
            path: PathBuf::from("/tmp/users.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = e.to_string();
        assert!(msg.contains("/tmp/users.json"), "{msg}");
        assert!(msg.contains("denied"), "{msg}");
    }

    #[test]
    fn storage_converts_into_lookup_error() {
        let e: LookupError = StorageError::Poisoned.into();
        assert!(matches!(e, LookupError::Storage(StorageError::Poisoned)));
    }
}
