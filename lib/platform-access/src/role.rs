//! Role and permission types for workshop access control.
//!
//! The backend sends the role as free text, and the prototypes it served
//! disagree on casing. Every value crossing the boundary is canonicalized
//! into the closed [`Role`] enumeration before any comparison happens.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::route::AppRoute;

/// Workshop role carried by an authenticated identity.
///
/// Parsing is case-insensitive and ignores surrounding whitespace. Values
/// outside the four canonical roles map to [`Role::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Workshop administrator.
    Admin,
    /// Mechanic working assigned appointments.
    Mecanico,
    /// Front-desk staff managing appointments and clients.
    Recepcionista,
    /// Customer booking appointments for their vehicles.
    Cliente,
    /// Any value the backend sent that is not a canonical role.
    Unknown,
}

impl Role {
    /// Every canonical role, in display order.
    pub const KNOWN: [Role; 4] = [
        Role::Admin,
        Role::Mecanico,
        Role::Recepcionista,
        Role::Cliente,
    ];

    /// Canonicalizes a raw role string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "ADMIN" => Self::Admin,
            "MECANICO" => Self::Mecanico,
            "RECEPCIONISTA" => Self::Recepcionista,
            "CLIENTE" => Self::Cliente,
            other => {
                tracing::debug!(role = other, "unrecognized role mapped to UNKNOWN");
                Self::Unknown
            }
        }
    }

    /// Returns the canonical (upper-case) name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Mecanico => "MECANICO",
            Self::Recepcionista => "RECEPCIONISTA",
            Self::Cliente => "CLIENTE",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Returns true if this role has admin privileges.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true for the four canonical roles.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Route a user with this role lands on after login or restore.
    #[must_use]
    pub fn landing_route(&self) -> AppRoute {
        match self {
            Self::Admin => AppRoute::AdminDashboard,
            Self::Mecanico => AppRoute::AssignedAppointments,
            Self::Recepcionista => AppRoute::AppointmentManagement,
            Self::Cliente => AppRoute::MyAppointments,
            Self::Unknown => AppRoute::Root,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Set of roles a view requires.
///
/// An empty set means "any authenticated user".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleSet {
    roles: Vec<Role>,
}

impl RoleSet {
    /// Creates an empty role set: any authenticated user is admitted.
    #[must_use]
    pub fn any_authenticated() -> Self {
        Self { roles: Vec::new() }
    }

    /// Creates a role set admitting only the given roles.
    #[must_use]
    pub fn only(roles: impl IntoIterator<Item = Role>) -> Self {
        let mut set = Self::any_authenticated();
        for role in roles {
            if !set.roles.contains(&role) {
                set.roles.push(role);
            }
        }
        set
    }

    /// Creates a role set from raw role names, canonicalizing each one.
    #[must_use]
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        Self::only(names.iter().map(|name| Role::parse(name.as_ref())))
    }

    /// Returns true when no specific role is required.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.roles.is_empty()
    }

    /// Returns true if a user holding `role` satisfies this set.
    #[must_use]
    pub fn admits(&self, role: Role) -> bool {
        self.is_unrestricted() || self.roles.contains(&role)
    }

    /// Returns the roles as a slice.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self::only(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ignores_case_and_whitespace() {
        for raw in ["cliente", "CLIENTE", "Cliente", "  cLiEnTe "] {
            assert_eq!(Role::parse(raw), Role::Cliente, "raw = {raw:?}");
        }
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("Mecanico"), Role::Mecanico);
        assert_eq!(Role::parse("recepcionista"), Role::Recepcionista);
    }

    #[test]
    fn legacy_and_garbage_roles_are_unknown() {
        assert_eq!(Role::parse("tecnico"), Role::Unknown);
        assert_eq!(Role::parse(""), Role::Unknown);
        assert_eq!(Role::parse("superuser"), Role::Unknown);
        assert!(!Role::Unknown.is_known());
    }

    #[test]
    fn role_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Cliente.is_admin());
    }

    #[test]
    fn landing_routes_follow_role() {
        assert_eq!(Role::Admin.landing_route(), AppRoute::AdminDashboard);
        assert_eq!(
            Role::Mecanico.landing_route(),
            AppRoute::AssignedAppointments
        );
        assert_eq!(
            Role::Recepcionista.landing_route(),
            AppRoute::AppointmentManagement
        );
        assert_eq!(Role::Cliente.landing_route(), AppRoute::MyAppointments);
        assert_eq!(Role::Unknown.landing_route(), AppRoute::Root);
    }

    #[test]
    fn deserializes_any_casing_and_serializes_canonical() {
        let role: Role = serde_json::from_str("\"recepcionista\"").expect("deserialize");
        assert_eq!(role, Role::Recepcionista);
        let json = serde_json::to_string(&role).expect("serialize");
        assert_eq!(json, "\"RECEPCIONISTA\"");
    }

    #[test]
    fn empty_set_admits_everyone() {
        let set = RoleSet::any_authenticated();
        assert!(set.is_unrestricted());
        for role in Role::KNOWN {
            assert!(set.admits(role));
        }
        assert!(set.admits(Role::Unknown));
    }

    #[test]
    fn restricted_set_admits_only_members() {
        let set = RoleSet::only([Role::Admin]);
        assert!(set.admits(Role::Admin));
        assert!(!set.admits(Role::Cliente));
        assert!(!set.admits(Role::Unknown));
    }

    #[test]
    fn from_names_canonicalizes_and_dedups() {
        let set = RoleSet::from_names(&["admin", "ADMIN", "Cliente"]);
        assert_eq!(set.roles(), &[Role::Admin, Role::Cliente]);
    }
}
