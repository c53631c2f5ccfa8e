//! Durable storage for the bearer token.
//!
//! One key, one value: the token string. Absence means anonymous. All
//! operations are synchronous so the session store can pair each write with
//! its in-memory state change.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use itam_auth::Credential;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("token storage I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("token storage is unavailable: {0}")]
    Unavailable(String),
}

pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<Credential>, StorageError>;

    fn save(&self, credential: &Credential) -> Result<(), StorageError>;

    /// Remove the token. Clearing an already-empty store is not an error.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Token kept in a single file (mode `0600` on Unix).
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<Credential>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Credential::new(contents).ok()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_err(e)),
        }
    }

    fn save(&self, credential: &Credential) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        // Write-then-rename; readers never see a partial token.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, credential.as_str()).map_err(|e| self.io_err(e))?;
        restrict_permissions(&tmp).map_err(|e| self.io_err(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Process-local store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<Credential>>, StorageError> {
        self.slot
            .lock()
            .map_err(|_| StorageError::Unavailable("memory token store poisoned".into()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<Credential>, StorageError> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, credential: &Credential) -> Result<(), StorageError> {
        *self.lock()? = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.lock()? = None;
        Ok(())
    }
}
