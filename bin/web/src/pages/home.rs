//! Home page component.

use crate::auth::AuthContext;
use leptos::prelude::*;

/// The public home page.
#[component]
pub fn HomePage() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let snapshot = auth.snapshot();

    view! {
        <div class="home-page">
            <h1>"Taller mecánico"</h1>
            <p>"Citas, vehículos y servicios de tu taller en un solo sitio."</p>
            {move || {
                let snapshot = snapshot.get();
                match snapshot.identity() {
                    Some(identity) => {
                        let greeting = format!("Hola, {}", identity.display_name());
                        let landing = identity.role().landing_route().path();
                        view! {
                            <div>
                                <h2>{greeting}</h2>
                                <a href=landing class="cta-button">"Ir a mi panel"</a>
                            </div>
                        }
                        .into_any()
                    }
                    None if snapshot.is_loading() => view! { <p>"Cargando..."</p> }.into_any(),
                    None => view! {
                        <div>
                            <a href="/login" class="cta-button">"Iniciar sesión"</a>
                            <a href="/register" class="link-button">"Crear cuenta"</a>
                        </div>
                    }
                    .into_any(),
                }
            }}
        </div>
    }
}
