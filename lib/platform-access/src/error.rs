//! Error types for the platform-access crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `AuthorizationError`: a settled session may not enter a view

use std::fmt;

use crate::role::{Role, RoleSet};

/// Errors from authorization checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// No identity is signed in.
    NotAuthenticated,
    /// The identity's role is not among the required ones.
    Forbidden { role: Role, required: RoleSet },
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated => {
                write!(f, "user is not authenticated")
            }
            Self::Forbidden { role, required } => {
                let required = required
                    .roles()
                    .iter()
                    .map(Role::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "role {role} is not allowed here (requires {required})")
            }
        }
    }
}

impl std::error::Error for AuthorizationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_authenticated_display() {
        let err = AuthorizationError::NotAuthenticated;
        assert!(err.to_string().contains("not authenticated"));
    }

    #[test]
    fn forbidden_display_lists_roles() {
        let err = AuthorizationError::Forbidden {
            role: Role::Cliente,
            required: RoleSet::only([Role::Admin, Role::Recepcionista]),
        };
        let text = err.to_string();
        assert!(text.contains("CLIENTE"));
        assert!(text.contains("ADMIN, RECEPCIONISTA"));
    }
}
