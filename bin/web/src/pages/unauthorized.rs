//! Page shown when the signed-in role may not open a view.

use crate::auth::AuthContext;
use leptos::prelude::*;
use taller_platform_access::AppRoute;

#[component]
pub fn UnauthorizedPage() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let snapshot = auth.snapshot();
    let back = move || {
        snapshot
            .get()
            .role()
            .map_or(AppRoute::Root, |role| role.landing_route())
            .path()
    };

    view! {
        <div class="unauthorized-page">
            <h1>"Acceso no autorizado"</h1>
            <p>"No tienes permiso para ver esta página."</p>
            <a href=back class="link-button">"Volver"</a>
        </div>
    }
}
