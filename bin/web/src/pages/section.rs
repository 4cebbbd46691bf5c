//! Frame for the role views (appointments, vehicles, services, users).
//!
//! Renders the route's heading for the signed-in user once the guard has let
//! them through.

use crate::auth::AuthContext;
use leptos::prelude::*;
use taller_platform_access::AppRoute;

/// Heading shown for a protected view.
#[must_use]
pub fn section_title(route: AppRoute) -> &'static str {
    match route {
        AppRoute::Root => "Inicio",
        AppRoute::Login => "Iniciar sesión",
        AppRoute::Register => "Crear cuenta",
        AppRoute::Unauthorized => "Acceso no autorizado",
        AppRoute::ConfirmEmail => "Confirmar email",
        AppRoute::PasswordReset => "Recuperar contraseña",
        AppRoute::AdminDashboard => "Panel de administración",
        AppRoute::Users => "Usuarios",
        AppRoute::Services => "Servicios",
        AppRoute::MyAppointments => "Mis citas",
        AppRoute::NewAppointment => "Nueva cita",
        AppRoute::MyVehicles => "Mis vehículos",
        AppRoute::Profile => "Mi perfil",
        AppRoute::AssignedAppointments => "Citas asignadas",
        AppRoute::ServiceHistory => "Historial de servicios",
        AppRoute::AppointmentManagement => "Gestión de citas",
        AppRoute::ClientManagement => "Gestión de clientes",
    }
}

#[component]
pub fn SectionPage(route: AppRoute) -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let snapshot = auth.snapshot();
    let who = move || {
        snapshot
            .get()
            .identity()
            .map(|identity| identity.display_name())
            .unwrap_or_default()
    };

    view! {
        <div class="section-page">
            <h1>{section_title(route)}</h1>
            <p class="section-user">{who}</p>
        </div>
    }
}
