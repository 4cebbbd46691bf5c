//! Browser token storage.

use std::sync::Arc;
use taller_session::CredentialStore;

/// Returns the store the app persists its token in.
///
/// In the browser this is `localStorage` under `key`. Builds without the
/// `csr` feature (tests, tooling) get an in-memory store.
#[must_use]
pub fn credential_store(key: &str) -> Arc<dyn CredentialStore> {
    #[cfg(feature = "csr")]
    {
        Arc::new(LocalStorageCredentialStore::new(key))
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = key;
        Arc::new(taller_session::MemoryCredentialStore::new())
    }
}

#[cfg(feature = "csr")]
pub use local::LocalStorageCredentialStore;

#[cfg(feature = "csr")]
mod local {
    use taller_session::{CredentialError, CredentialStore};
    use web_sys::Storage;

    /// Token store backed by `window.localStorage`.
    ///
    /// Holds only the key; the storage handle is looked up on every call so
    /// the store stays `Send + Sync`.
    #[derive(Debug, Clone)]
    pub struct LocalStorageCredentialStore {
        key: String,
    }

    impl LocalStorageCredentialStore {
        #[must_use]
        pub fn new(key: impl Into<String>) -> Self {
            Self { key: key.into() }
        }

        fn storage(&self) -> Result<Storage, CredentialError> {
            web_sys::window()
                .ok_or_else(|| unavailable("no window"))?
                .local_storage()
                .map_err(|e| unavailable(&format!("{e:?}")))?
                .ok_or_else(|| unavailable("localStorage disabled"))
        }
    }

    fn unavailable(reason: &str) -> CredentialError {
        CredentialError::StorageUnavailable {
            reason: reason.to_string(),
        }
    }

    impl CredentialStore for LocalStorageCredentialStore {
        fn save(&self, token: &str) -> Result<(), CredentialError> {
            self.storage()?
                .set_item(&self.key, token)
                .map_err(|e| unavailable(&format!("{e:?}")))
        }

        fn read(&self) -> Result<Option<String>, CredentialError> {
            self.storage()?
                .get_item(&self.key)
                .map_err(|e| unavailable(&format!("{e:?}")))
        }

        fn clear(&self) -> Result<(), CredentialError> {
            self.storage()?
                .remove_item(&self.key)
                .map_err(|e| unavailable(&format!("{e:?}")))
        }
    }
}
