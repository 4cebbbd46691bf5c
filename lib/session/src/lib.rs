//! Client-side session core for the taller workshop frontend.
//!
//! This crate provides:
//! - Bearer token persistence (`CredentialStore` and its implementations)
//! - The backend session client (`SessionClient`): login, logout, restore,
//!   registration, profile and password upkeep, and authorized requests
//!   with the 401 interceptor
//! - The owned session container the UI renders from (`SessionState`)
//!
//! Front ends build one `SessionState` at startup, call
//! [`SessionState::bootstrap`] once, and perform the [`Redirect`]s it hands
//! back.
//!
//! [`Redirect`]: taller_platform_access::Redirect

pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod state;

#[cfg(test)]
mod test_support;

// Re-export main types at crate root
pub use client::{AuthorizedRequest, ExpiryListener, NewAccount, ProfileUpdate, SessionClient};
pub use config::{EndpointConfig, SessionConfig};
#[cfg(not(target_arch = "wasm32"))]
pub use credential::FileCredentialStore;
pub use credential::{CredentialStore, MemoryCredentialStore};
pub use error::{CredentialError, SessionError};
pub use state::SessionState;
