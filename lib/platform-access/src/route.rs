//! Application routes and redirect targets.
//!
//! Routes are a closed set: the guard, the landing table and the effect
//! layers (web app, CLI) all name views through [`AppRoute`] rather than
//! through ad-hoc path strings.

use std::fmt;

use crate::role::{Role, RoleSet};

/// Query parameter carrying the originally requested location on the login
/// route.
pub const RETURN_TO_PARAM: &str = "from";

/// A view of the workshop frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppRoute {
    /// Application root / home.
    Root,
    /// Login entry point.
    Login,
    /// Account registration.
    Register,
    /// Shown when an authenticated user lacks the required role.
    Unauthorized,
    /// Email confirmation; the token follows as a path segment.
    ConfirmEmail,
    /// Password reset request, and the new-password form when a `token` is
    /// in the query.
    PasswordReset,
    /// Admin dashboard.
    AdminDashboard,
    /// User management (admin).
    Users,
    /// Service catalogue management (admin).
    Services,
    /// A customer's own appointments.
    MyAppointments,
    /// Booking form for a customer.
    NewAppointment,
    /// A customer's vehicles, including the create/edit sub-views.
    MyVehicles,
    /// Own profile, for any authenticated user.
    Profile,
    /// Appointments assigned to a mechanic.
    AssignedAppointments,
    /// A mechanic's service history.
    ServiceHistory,
    /// Appointment management (front desk).
    AppointmentManagement,
    /// Client management (front desk).
    ClientManagement,
}

impl AppRoute {
    /// Every route, in router declaration order.
    pub const ALL: [AppRoute; 17] = [
        AppRoute::Root,
        AppRoute::Login,
        AppRoute::Register,
        AppRoute::Unauthorized,
        AppRoute::ConfirmEmail,
        AppRoute::PasswordReset,
        AppRoute::AdminDashboard,
        AppRoute::Users,
        AppRoute::Services,
        AppRoute::MyAppointments,
        AppRoute::NewAppointment,
        AppRoute::MyVehicles,
        AppRoute::Profile,
        AppRoute::AssignedAppointments,
        AppRoute::ServiceHistory,
        AppRoute::AppointmentManagement,
        AppRoute::ClientManagement,
    ];

    /// Returns the path the router mounts this view at.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Unauthorized => "/unauthorized",
            Self::ConfirmEmail => "/confirmar-email",
            Self::PasswordReset => "/recuperar-password",
            Self::AdminDashboard => "/dashboard",
            Self::Users => "/usuarios",
            Self::Services => "/servicios",
            Self::MyAppointments => "/mis-citas",
            Self::NewAppointment => "/nueva-cita",
            Self::MyVehicles => "/mis-vehiculos",
            Self::Profile => "/mi-perfil",
            Self::AssignedAppointments => "/citas-asignadas",
            Self::ServiceHistory => "/historial-servicios",
            Self::AppointmentManagement => "/gestion-citas",
            Self::ClientManagement => "/gestion-clientes",
        }
    }

    /// Resolves a location path (query and fragment ignored) to a route.
    ///
    /// Sub-paths resolve to their parent view, so `/mis-vehiculos/editar/3`
    /// is guarded like `/mis-vehiculos`.
    #[must_use]
    pub fn from_path(location: &str) -> Option<Self> {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        if path.is_empty() {
            return Some(Self::Root);
        }
        Self::ALL
            .into_iter()
            .filter(|route| *route != Self::Root)
            .find(|route| {
                path == route.path()
                    || path
                        .strip_prefix(route.path())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
    }

    /// Returns true if the view can be rendered without a session.
    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Self::Root
                | Self::Login
                | Self::Register
                | Self::Unauthorized
                | Self::ConfirmEmail
                | Self::PasswordReset
        )
    }

    /// Roles required to enter a non-public view.
    #[must_use]
    pub fn required_roles(&self) -> RoleSet {
        match self {
            Self::AdminDashboard | Self::Users | Self::Services => RoleSet::only([Role::Admin]),
            Self::MyAppointments | Self::NewAppointment | Self::MyVehicles => {
                RoleSet::only([Role::Cliente])
            }
            Self::AssignedAppointments | Self::ServiceHistory => RoleSet::only([Role::Mecanico]),
            Self::AppointmentManagement | Self::ClientManagement => {
                RoleSet::only([Role::Recepcionista])
            }
            Self::Root
            | Self::Login
            | Self::Register
            | Self::Unauthorized
            | Self::ConfirmEmail
            | Self::PasswordReset
            | Self::Profile => RoleSet::any_authenticated(),
        }
    }
}

impl fmt::Display for AppRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A navigation the effect layer should perform.
///
/// Produced by the session state (after login, logout or restore) and by the
/// access guard; never performed by them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    target: AppRoute,
    return_to: Option<String>,
}

impl Redirect {
    /// Redirect to a route.
    #[must_use]
    pub fn to(target: AppRoute) -> Self {
        Self {
            target,
            return_to: None,
        }
    }

    /// Redirect to the login entry point, remembering where the user was
    /// headed so the login form can send them back afterwards.
    #[must_use]
    pub fn to_login_from(requested: impl Into<String>) -> Self {
        let requested = requested.into();
        let return_to = is_return_target(&requested).then_some(requested);
        Self {
            target: AppRoute::Login,
            return_to,
        }
    }

    /// Returns the target route.
    #[must_use]
    pub fn target(&self) -> AppRoute {
        self.target
    }

    /// Returns the preserved location, if any.
    #[must_use]
    pub fn return_to(&self) -> Option<&str> {
        self.return_to.as_deref()
    }

    /// Returns the full location to navigate to.
    #[must_use]
    pub fn location(&self) -> String {
        match &self.return_to {
            Some(from) => format!(
                "{}?{RETURN_TO_PARAM}={}",
                self.target.path(),
                urlencoding::encode(from)
            ),
            None => self.target.path().to_string(),
        }
    }
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location())
    }
}

/// Only protected in-app views are worth returning to after login; public
/// pages fall through to the role's landing route.
fn is_return_target(location: &str) -> bool {
    AppRoute::from_path(location).is_some_and(|route| !route.is_public())
}

/// Extracts a safe post-login destination from a login location's query.
///
/// Only protected in-app paths are honoured, so a crafted `from` cannot send
/// the user off-site or back to a public page.
#[must_use]
pub fn return_to_from_query(query: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == RETURN_TO_PARAM)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
        .filter(|value| value.starts_with('/') && !value.starts_with("//"))
        .filter(|value| is_return_target(value))
}
