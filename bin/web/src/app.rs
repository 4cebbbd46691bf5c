//! Main Leptos application component and routing.

use crate::auth::{AuthContext, Protected, SessionBootstrap, session_config};
use crate::pages::{
    ConfirmEmailPage, HomePage, LoginPage, PasswordResetPage, ProfilePage, RegisterPage,
    SectionPage, UnauthorizedPage,
};
use leptos::ev::MouseEvent;
use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    components::{Route, Router, Routes},
    hooks::use_navigate,
    path,
};
use taller_platform_access::{AppRoute, Role};

/// The application root.
///
/// Builds the session once per page load and provides it to every
/// component. Every non-public route is wrapped in [`Protected`].
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let auth = match AuthContext::new(session_config()) {
        Ok(auth) => auth,
        Err(e) => {
            tracing::error!(error = %e, "failed to start session");
            return view! {
                <Title text="Taller"/>
                <p class="error">"No se pudo iniciar la aplicación."</p>
            }
            .into_any();
        }
    };
    provide_context(auth);

    view! {
        <Title text="Taller"/>
        <Router>
            <SessionBootstrap/>
            <Header/>
            <main class="container">
                <Routes fallback=|| "Página no encontrada.".into_view()>
                    <Route path=path!("/") view=HomePage/>
                    <Route path=path!("/login") view=LoginPage/>
                    <Route path=path!("/register") view=RegisterPage/>
                    <Route path=path!("/unauthorized") view=UnauthorizedPage/>
                    <Route path=path!("/confirmar-email/:token") view=ConfirmEmailPage/>
                    <Route path=path!("/recuperar-password") view=PasswordResetPage/>
                    <Route path=path!("/dashboard") view=|| section(AppRoute::AdminDashboard)/>
                    <Route path=path!("/usuarios") view=|| section(AppRoute::Users)/>
                    <Route path=path!("/servicios") view=|| section(AppRoute::Services)/>
                    <Route path=path!("/mis-citas") view=|| section(AppRoute::MyAppointments)/>
                    <Route path=path!("/nueva-cita") view=|| section(AppRoute::NewAppointment)/>
                    <Route path=path!("/mis-vehiculos") view=|| section(AppRoute::MyVehicles)/>
                    <Route path=path!("/mis-vehiculos/*rest") view=|| section(AppRoute::MyVehicles)/>
                    <Route path=path!("/mi-perfil") view=ProfileRoute/>
                    <Route path=path!("/citas-asignadas") view=|| section(AppRoute::AssignedAppointments)/>
                    <Route path=path!("/historial-servicios") view=|| section(AppRoute::ServiceHistory)/>
                    <Route path=path!("/gestion-citas") view=|| section(AppRoute::AppointmentManagement)/>
                    <Route path=path!("/gestion-clientes") view=|| section(AppRoute::ClientManagement)/>
                </Routes>
            </main>
        </Router>
    }
    .into_any()
}

fn section(route: AppRoute) -> impl IntoView {
    view! {
        <Protected route=route>
            <SectionPage route=route/>
        </Protected>
    }
}

#[component]
fn ProfileRoute() -> impl IntoView {
    view! {
        <Protected route=AppRoute::Profile>
            <ProfilePage/>
        </Protected>
    }
}

/// Links shown in the header for each role.
#[must_use]
pub fn navigation_for(role: Role) -> &'static [AppRoute] {
    match role {
        Role::Admin => &[AppRoute::AdminDashboard, AppRoute::Users, AppRoute::Services],
        Role::Mecanico => &[AppRoute::AssignedAppointments, AppRoute::ServiceHistory],
        Role::Recepcionista => &[AppRoute::AppointmentManagement, AppRoute::ClientManagement],
        Role::Cliente => &[
            AppRoute::MyAppointments,
            AppRoute::NewAppointment,
            AppRoute::MyVehicles,
        ],
        Role::Unknown => &[],
    }
}

/// Header component with navigation and user menu.
#[component]
fn Header() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let snapshot = auth.snapshot();

    view! {
        <header class="header">
            <div class="header-left">
                <a href="/" class="logo">"Taller"</a>
            </div>
            <div class="header-right">
                {move || {
                    let snapshot = snapshot.get();
                    match snapshot.identity() {
                        Some(identity) => view! {
                            <UserMenu
                                display_name=identity.display_name()
                                role=identity.role()
                            />
                        }
                        .into_any(),
                        None if snapshot.is_loading() => view! { <span>"Cargando..."</span> }.into_any(),
                        None => view! {
                            <a href="/login" class="login-button">"Iniciar sesión"</a>
                        }
                        .into_any(),
                    }
                }}
            </div>
        </header>
    }
}

/// User menu with the role's navigation and logout.
#[component]
fn UserMenu(display_name: String, role: Role) -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let navigate = use_navigate();

    let on_logout = move |_: MouseEvent| {
        let redirect = auth.state().logout();
        navigate(&redirect.location(), Default::default());
    };

    view! {
        <div class="user-menu">
            <span class="user-name">{display_name}</span>
            <div class="user-dropdown">
                {navigation_for(role)
                    .iter()
                    .map(|route| view! {
                        <a href=route.path()>{crate::pages::section::section_title(*route)}</a>
                    })
                    .collect_view()}
                <a href="/mi-perfil">"Mi perfil"</a>
                <button class="logout-button" on:click=on_logout>"Cerrar sesión"</button>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taller_platform_access::{AccessGuard, GuardDecision, Identity, SessionSnapshot};
    use taller_core::UserId;

    #[test]
    fn navigation_only_offers_reachable_views() {
        for role in Role::KNOWN {
            let session =
                SessionSnapshot::signed_in(Identity::new(UserId::new(1), "a@example.com", role));
            for route in navigation_for(role) {
                assert_eq!(
                    AccessGuard::for_route(*route).decide(&session),
                    GuardDecision::Allowed,
                    "{role} should reach {route}"
                );
            }
        }
    }

    #[test]
    fn navigation_includes_landing_route() {
        for role in Role::KNOWN {
            assert!(navigation_for(role).contains(&role.landing_route()));
        }
    }
}
