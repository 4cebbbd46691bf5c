//! Login page component.

use crate::auth::AuthContext;
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_location, use_navigate};
use taller_platform_access::return_to_from_query;

/// Login form. Sends the user back to where they were headed, or to their
/// role's landing page.
#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let navigate = use_navigate();
    let search = use_location().search;

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let (error, set_error) = signal(Option::<String>::None);
    let (submitting, set_submitting) = signal(false);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        set_submitting.set(true);
        set_error.set(None);

        let state = auth.state().clone();
        let navigate = navigate.clone();
        let return_to = return_to_from_query(&search.get_untracked());
        let identifier = email.get_untracked();
        let secret = password.get_untracked();

        spawn_local(async move {
            match state.login(&identifier, &secret).await {
                Ok(landing) => {
                    let target = return_to.unwrap_or_else(|| landing.location());
                    navigate(&target, Default::default());
                }
                Err(e) => {
                    tracing::debug!(error = %e, "login failed");
                    set_error.set(Some(e.current_context().user_message()));
                }
            }
            set_submitting.set(false);
        });
    };

    view! {
        <div class="login-page">
            <div class="login-box">
                <h1>"Iniciar sesión"</h1>
                <form on:submit=on_submit>
                    <label for="email">"Email"</label>
                    <input id="email" type="email" required bind:value=email/>
                    <label for="password">"Contraseña"</label>
                    <input id="password" type="password" required bind:value=password/>
                    {move || error.get().map(|msg| view! { <p class="error">{msg}</p> })}
                    <button type="submit" class="login-button" disabled=move || submitting.get()>
                        "Entrar"
                    </button>
                </form>
                <p><a href="/recuperar-password">"¿Olvidaste tu contraseña?"</a></p>
                <p>"¿No tienes cuenta? " <a href="/register">"Regístrate"</a></p>
            </div>
        </div>
    }
}
