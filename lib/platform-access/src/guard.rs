//! Route protection decisions.
//!
//! The guard is re-evaluated on every render from the current
//! [`SessionSnapshot`]; it keeps no memory of earlier decisions, so a role or
//! authentication change re-routes immediately.

use crate::error::AuthorizationError;
use crate::role::{Role, RoleSet};
use crate::route::{AppRoute, Redirect};
use crate::session::SessionSnapshot;

/// Outcome of evaluating a protected view against the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still loading: render a neutral placeholder, decide later.
    Checking,
    /// No session: go to login.
    Denied,
    /// Signed in without a required role: go to the unauthorized view.
    Forbidden,
    /// Render the requested view.
    Allowed,
}

/// Guard for a view requiring a set of roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGuard {
    required: RoleSet,
}

impl AccessGuard {
    /// Creates a guard for the given required roles.
    #[must_use]
    pub fn new(required: RoleSet) -> Self {
        Self { required }
    }

    /// Creates a guard admitting any authenticated user.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::new(RoleSet::any_authenticated())
    }

    /// Creates the guard for a route's required roles.
    #[must_use]
    pub fn for_route(route: AppRoute) -> Self {
        Self::new(route.required_roles())
    }

    /// Returns the required roles.
    #[must_use]
    pub fn required(&self) -> &RoleSet {
        &self.required
    }

    /// Decides what to do with the current session.
    #[must_use]
    pub fn decide(&self, session: &SessionSnapshot) -> GuardDecision {
        if session.is_loading() {
            return GuardDecision::Checking;
        }
        match session.role() {
            None => GuardDecision::Denied,
            Some(role) if self.required.admits(role) => GuardDecision::Allowed,
            Some(_) => GuardDecision::Forbidden,
        }
    }

    /// Maps a decision to the navigation it requires, if any.
    ///
    /// `requested` is the location the user tried to enter; it is preserved
    /// on the login redirect.
    #[must_use]
    pub fn redirect(&self, session: &SessionSnapshot, requested: &str) -> Option<Redirect> {
        match self.decide(session) {
            GuardDecision::Checking | GuardDecision::Allowed => None,
            GuardDecision::Denied => Some(Redirect::to_login_from(requested)),
            GuardDecision::Forbidden => Some(Redirect::to(AppRoute::Unauthorized)),
        }
    }

    /// Checks a settled session, for callers that do not render.
    ///
    /// A loading session is treated as not authenticated.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without an identity and `Forbidden` when
    /// the identity's role is not admitted.
    pub fn check(&self, session: &SessionSnapshot) -> Result<(), AuthorizationError> {
        match self.decide(session) {
            GuardDecision::Allowed => Ok(()),
            GuardDecision::Checking | GuardDecision::Denied => {
                Err(AuthorizationError::NotAuthenticated)
            }
            GuardDecision::Forbidden => Err(AuthorizationError::Forbidden {
                role: session.role().unwrap_or(Role::Unknown),
                required: self.required.clone(),
            }),
        }
    }
}

impl From<RoleSet> for AccessGuard {
    fn from(required: RoleSet) -> Self {
        Self::new(required)
    }
}
