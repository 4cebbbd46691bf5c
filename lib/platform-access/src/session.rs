//! Snapshot of the client-side session.
//!
//! A snapshot is plain data: who is signed in and whether a session
//! operation (the startup restore or a login) is still in flight. The
//! authentication flag is derived from the identity rather than stored, so
//! the two can never disagree.

use serde::{Deserialize, Serialize};

use crate::role::Role;
use crate::user::Identity;

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// The signed-in identity, if any.
    identity: Option<Identity>,
    /// Number of session operations currently in flight.
    pending: u32,
}

impl SessionSnapshot {
    /// A snapshot waiting on the startup restore: no identity, loading.
    #[must_use]
    pub fn restoring() -> Self {
        Self {
            identity: None,
            pending: 1,
        }
    }

    /// A settled, signed-out snapshot.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// A settled snapshot for the given identity.
    #[must_use]
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            pending: 0,
        }
    }

    /// Returns the signed-in identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Returns the canonical role of the signed-in identity.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(Identity::role)
    }

    /// Returns true when an identity is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Returns true while a restore or login is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    /// Replaces the identity wholesale.
    pub fn set_identity(&mut self, identity: Option<Identity>) {
        self.identity = identity;
    }

    /// Marks one more operation as in flight.
    pub fn begin_operation(&mut self) {
        self.pending = self.pending.saturating_add(1);
    }

    /// Marks one in-flight operation as finished.
    pub fn end_operation(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }
}
