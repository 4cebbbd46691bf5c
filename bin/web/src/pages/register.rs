//! Registration page component.

use crate::auth::AuthContext;
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use taller_platform_access::AppRoute;
use taller_session::{NewAccount, SessionError};

/// Customer sign-up. Does not log in; sends the user to the login form.
#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let navigate = use_navigate();

    let full_name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let phone = RwSignal::new(String::new());
    let (error, set_error) = signal(Option::<String>::None);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        set_error.set(None);

        let client = auth.state().client().clone();
        let navigate = navigate.clone();
        let mut account = NewAccount::new(
            full_name.get_untracked(),
            email.get_untracked(),
            password.get_untracked(),
        );
        let phone = phone.get_untracked();
        if !phone.trim().is_empty() {
            account = account.with_phone(phone.trim());
        }

        spawn_local(async move {
            match client.register(&account).await {
                Ok(_) => navigate(AppRoute::Login.path(), Default::default()),
                Err(e) => {
                    let message = match e.current_context() {
                        SessionError::Rejected { reason, .. } if !reason.is_empty() => {
                            reason.clone()
                        }
                        other => other.user_message(),
                    };
                    set_error.set(Some(message));
                }
            }
        });
    };

    view! {
        <div class="login-page">
            <div class="login-box">
                <h1>"Crear cuenta"</h1>
                <form on:submit=on_submit>
                    <label for="full-name">"Nombre completo"</label>
                    <input id="full-name" type="text" required bind:value=full_name/>
                    <label for="email">"Email"</label>
                    <input id="email" type="email" required bind:value=email/>
                    <label for="phone">"Teléfono"</label>
                    <input id="phone" type="tel" bind:value=phone/>
                    <label for="password">"Contraseña"</label>
                    <input id="password" type="password" required bind:value=password/>
                    {move || error.get().map(|msg| view! { <p class="error">{msg}</p> })}
                    <button type="submit" class="login-button">"Registrarse"</button>
                </form>
                <p>"¿Ya tienes cuenta? " <a href="/login">"Inicia sesión"</a></p>
            </div>
        </div>
    }
}
