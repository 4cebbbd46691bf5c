//! The single owned session container the front ends render from.
//!
//! `SessionState` wraps a [`SessionClient`] and publishes a
//! [`SessionSnapshot`] through a `tokio::sync::watch` channel. Every change
//! goes through one of the operations below; there are no setters.
//! Operations return [`Redirect`] values and leave navigation to the caller.

use crate::client::{ProfileUpdate, SessionClient};
use crate::error::SessionError;
use std::sync::Arc;
use taller_core::Result;
use taller_platform_access::{AppRoute, Identity, Redirect, SessionSnapshot};
use tokio::sync::{OnceCell, watch};
use tracing::debug;

/// Session state shared by everything in the front end.
///
/// Cheap to clone; clones share the same snapshot and client.
#[derive(Clone)]
pub struct SessionState {
    client: SessionClient,
    snapshot: Arc<watch::Sender<SessionSnapshot>>,
    restored: Arc<OnceCell<Option<Identity>>>,
}

/// Counts an operation as pending for as long as it is alive.
struct PendingOperation {
    snapshot: Arc<watch::Sender<SessionSnapshot>>,
}

impl PendingOperation {
    fn begin(snapshot: &Arc<watch::Sender<SessionSnapshot>>) -> Self {
        snapshot.send_modify(SessionSnapshot::begin_operation);
        Self {
            snapshot: Arc::clone(snapshot),
        }
    }
}

impl Drop for PendingOperation {
    fn drop(&mut self) {
        self.snapshot.send_modify(SessionSnapshot::end_operation);
    }
}

impl SessionState {
    /// Creates the state around `client`.
    ///
    /// The initial snapshot is loading until [`Self::bootstrap`] has run, so
    /// guards stay undecided instead of bouncing a signed-in user to login.
    #[must_use]
    pub fn new(client: SessionClient) -> Self {
        let (sender, _) = watch::channel(SessionSnapshot::restoring());
        let snapshot = Arc::new(sender);

        let on_expired = Arc::downgrade(&snapshot);
        client.on_session_expired(move || {
            if let Some(snapshot) = on_expired.upgrade() {
                debug!("clearing identity after expired session");
                snapshot.send_modify(|s| s.set_identity(None));
            }
        });

        Self {
            client,
            snapshot,
            restored: Arc::new(OnceCell::new()),
        }
    }

    /// Returns the underlying client, for authorized requests.
    #[must_use]
    pub fn client(&self) -> &SessionClient {
        &self.client
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Subscribes to snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.subscribe()
    }

    /// Returns the signed-in identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.snapshot.borrow().identity().cloned()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.snapshot.borrow().is_authenticated()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.snapshot.borrow().is_loading()
    }

    /// Marks the startup restore as done without running it.
    ///
    /// Used by operations that replace the session outright. Does nothing if
    /// a restore already ran or is running.
    fn skip_restore(&self) {
        if self.restored.set(None).is_ok() {
            debug!("startup restore skipped");
            self.snapshot.send_modify(SessionSnapshot::end_operation);
        }
    }

    /// Restores the stored session, once per state.
    ///
    /// Later calls wait for and reuse the first restore. A login or logout
    /// made before the first call takes its place. Returns the role's
    /// landing page when the user is signed in and sitting on the root.
    pub async fn bootstrap(&self, current_path: &str) -> Option<Redirect> {
        self.restored
            .get_or_init(|| async {
                let identity = self.client.restore_session().await;
                self.snapshot.send_modify(|s| {
                    if let Some(identity) = &identity {
                        s.set_identity(Some(identity.clone()));
                    }
                    s.end_operation();
                });
                debug!(restored = identity.is_some(), "bootstrap finished");
                identity
            })
            .await;

        if AppRoute::from_path(current_path) != Some(AppRoute::Root) {
            return None;
        }
        let role = self.snapshot.borrow().role()?;
        Some(Redirect::to(role.landing_route()))
    }

    /// Logs in and returns the role's landing page.
    ///
    /// On failure the identity is left as it was and the error is returned
    /// untouched; nothing is retried.
    ///
    /// # Errors
    ///
    /// Any error from [`SessionClient::login`].
    pub async fn login(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<Redirect, SessionError> {
        let _pending = PendingOperation::begin(&self.snapshot);
        self.skip_restore();
        let identity = self.client.login(identifier, secret).await?;
        let landing = identity.role().landing_route();
        self.snapshot.send_modify(|s| s.set_identity(Some(identity)));
        Ok(Redirect::to(landing))
    }

    /// Saves profile changes and replaces the identity with the backend's
    /// answer.
    ///
    /// The session is not marked loading, so protected views stay mounted.
    /// The answer is dropped if the session changed to another user (or to
    /// none) meanwhile.
    ///
    /// # Errors
    ///
    /// Any error from [`SessionClient::update_profile`].
    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<Identity, SessionError> {
        let identity = self.client.update_profile(update).await?;
        self.snapshot.send_if_modified(|s| {
            let same_user = s.identity().is_some_and(|current| current.id() == identity.id());
            if same_user {
                s.set_identity(Some(identity.clone()));
            } else {
                debug!("session changed during profile update, keeping current identity");
            }
            same_user
        });
        Ok(identity)
    }

    /// Logs out and returns the login page.
    pub fn logout(&self) -> Redirect {
        self.skip_restore();
        self.client.logout();
        self.snapshot.send_modify(|s| s.set_identity(None));
        Redirect::to(AppRoute::Login)
    }
}
