//! Persistent storage for the bearer token.
//!
//! A store holds exactly one entry: the raw token returned by the login
//! endpoint. Tokens are opaque; nothing here inspects or validates them.

use crate::error::CredentialError;
use std::sync::Mutex;
use tracing::warn;

/// Trait for bearer token storage.
///
/// Implementations are synchronous: both browser `localStorage` and the
/// filesystem answer without suspending, and the session client relies on
/// writing the store while it holds its attachment lock.
pub trait CredentialStore: Send + Sync {
    /// Replaces the stored token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, token: &str) -> Result<(), CredentialError>;

    /// Returns the stored token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn read(&self) -> Result<Option<String>, CredentialError>;

    /// Removes the stored token. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn clear(&self) -> Result<(), CredentialError>;
}

/// Reads the token, treating a storage failure as "no token".
pub(crate) fn read_or_absent(store: &dyn CredentialStore) -> Option<String> {
    match store.read() {
        Ok(token) => token.filter(|t| !t.is_empty()),
        Err(e) => {
            warn!(error = %e, "credential store unreadable, treating token as absent");
            None
        }
    }
}

/// Clears the token, logging a storage failure instead of returning it.
pub(crate) fn clear_or_warn(store: &dyn CredentialStore) {
    if let Err(e) = store.clear() {
        warn!(error = %e, "failed to clear credential store");
    }
}

/// In-process token store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, CredentialError> {
        self.token
            .lock()
            .map_err(|_| CredentialError::StorageUnavailable {
                reason: "memory store lock poisoned".to_string(),
            })
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, token: &str) -> Result<(), CredentialError> {
        *self.slot()? = Some(token.to_string());
        Ok(())
    }

    fn read(&self) -> Result<Option<String>, CredentialError> {
        Ok(self.slot()?.clone())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self.slot()? = None;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileCredentialStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use super::CredentialStore;
    use crate::error::CredentialError;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    /// Token store backed by a single file.
    ///
    /// The file holds the raw token and nothing else. A missing file means
    /// no token. Parent directories are created on first save.
    #[derive(Debug, Clone)]
    pub struct FileCredentialStore {
        path: PathBuf,
    }

    impl FileCredentialStore {
        /// Creates a store at `path`. Nothing is touched until first use.
        #[must_use]
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        /// Returns the file path.
        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn unavailable(&self, action: &str, e: &std::io::Error) -> CredentialError {
            CredentialError::StorageUnavailable {
                reason: format!("failed to {action} {}: {e}", self.path.display()),
            }
        }
    }

    impl CredentialStore for FileCredentialStore {
        fn save(&self, token: &str) -> Result<(), CredentialError> {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| self.unavailable("create", &e))?;
            }
            std::fs::write(&self.path, token).map_err(|e| self.unavailable("write", &e))
        }

        fn read(&self) -> Result<Option<String>, CredentialError> {
            match std::fs::read_to_string(&self.path) {
                Ok(contents) => {
                    let token = contents.trim();
                    Ok((!token.is_empty()).then(|| token.to_string()))
                }
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(self.unavailable("read", &e)),
            }
        }

        fn clear(&self) -> Result<(), CredentialError> {
            match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(self.unavailable("remove", &e)),
            }
        }
    }
}
