//! Single-file JSON backend (`users.json`).
//!
//! Layout: `{"users": {"<id>": {"searches": 0, "isPremium": false, "remainingSearches": 5}}}`,
//! pretty-printed. The file is created on first write; a missing file reads as
//! empty. Every `put` rewrites the whole document through a temp file and an
//! atomic rename.
//!
//! The bot and `rcinfo quota` may run as separate processes on one file, so
//! each read holds a shared `flock` and each read-modify-write an exclusive one
//! on the `users.json.lock` sidecar.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

use super::backend::QuotaBackend;
use super::QuotaRecord;

#[derive(Debug, Default, Serialize, Deserialize)]
struct QuotaFile {
    #[serde(default)]
    users: BTreeMap<String, QuotaRecord>,
}

#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    /// In-process guard; the sidecar `flock` covers other processes.
    lock: Mutex<()>,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Default location: `~/.local/state/rcinfo/users.json`.
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("rcinfo")?;
        Ok(xdg_dirs.get_state_home().join("rcinfo").join("users.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `users.json` -> `users.json.lock`, next to the data file.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Open the sidecar and take an advisory lock on it. The lock is released
    /// when the returned file is dropped.
    fn lock_file(&self, mode: LockMode) -> std::io::Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;
        flock(&file, mode)?;
        Ok(file)
    }

    fn read(&self) -> Result<QuotaFile, StorageError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(QuotaFile::default()),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(QuotaFile::default());
        }
        serde_json::from_slice(&bytes).map_err(|source| StorageError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, file: &QuotaFile) -> Result<(), StorageError> {
        let write_err = |source: std::io::Error| StorageError::Write {
            path: self.path.clone(),
            source,
        };
        let dir = self.dir();
        let json = serde_json::to_string_pretty(file).map_err(|e| write_err(e.into()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

impl QuotaBackend for JsonFileBackend {
    fn get(&self, user_id: &str) -> Result<Option<QuotaRecord>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let _shared = match self.lock_file(LockMode::Shared) {
            Ok(f) => f,
            // No directory yet means no data file either.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Lock {
                    path: self.lock_path(),
                    source,
                })
            }
        };
        Ok(self.read()?.users.remove(user_id))
    }

    fn put(&self, user_id: &str, record: &QuotaRecord) -> Result<(), StorageError> {
        self.update(user_id, &mut |_: Option<QuotaRecord>| Some(record.clone()))?;
        Ok(())
    }

    /// Read, apply and write back under one exclusive file lock, so another
    /// process cannot slip a write in between.
    fn update(
        &self,
        user_id: &str,
        f: &mut dyn FnMut(Option<QuotaRecord>) -> Option<QuotaRecord>,
    ) -> Result<Option<QuotaRecord>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        std::fs::create_dir_all(self.dir()).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })?;
        let _exclusive = self
            .lock_file(LockMode::Exclusive)
            .map_err(|source| StorageError::Lock {
                path: self.lock_path(),
                source,
            })?;

        let mut file = self.read()?;
        let Some(next) = f(file.users.get(user_id).cloned()) else {
            return Ok(None);
        };
        file.users.insert(user_id.to_string(), next.clone());
        self.write(&file)?;
        tracing::debug!(user = user_id, path = %self.path.display(), "quota record written");
        Ok(Some(next))
    }
}

#[derive(Debug, Clone, Copy)]
enum LockMode {
    Shared,
    Exclusive,
}

/// Blocking `flock` on the whole file.
fn flock(file: &File, mode: LockMode) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        let op = match mode {
            LockMode::Shared => libc::LOCK_SH,
            LockMode::Exclusive => libc::LOCK_EX,
        };
        loop {
            // SAFETY: fd is a valid descriptor owned by `file` for the whole call.
            let rc = unsafe { libc::flock(file.as_raw_fd(), op) };
            if rc == 0 {
                return Ok(());
            }
            let err = std::io::Error::last_os_error();
            if err.kind() != std::io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = (file, mode);
        Ok(())
    }
}
