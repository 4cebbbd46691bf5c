//! Password recovery: ask for a reset email, then set a new password from
//! the emailed link (`/recuperar-password?token=...`).

use crate::auth::AuthContext;
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_navigate, use_query_map};
use taller_platform_access::AppRoute;
use taller_session::SessionError;

fn failure_message(error: &SessionError, fallback: &str) -> String {
    match error {
        SessionError::Rejected { reason, .. } if !reason.is_empty() => reason.clone(),
        SessionError::Transport { .. } => error.user_message(),
        _ => fallback.to_string(),
    }
}

#[component]
pub fn PasswordResetPage() -> impl IntoView {
    let query = use_query_map();

    move || match query.get().get("token").filter(|t| !t.is_empty()) {
        Some(token) => view! { <NewPasswordForm token=token/> }.into_any(),
        None => view! { <RequestResetForm/> }.into_any(),
    }
}

#[component]
fn RequestResetForm() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let email = RwSignal::new(String::new());
    let (message, set_message) = signal(Option::<String>::None);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let client = auth.state().client().clone();
        let address = email.get_untracked();

        spawn_local(async move {
            let text = match client.request_password_reset(&address).await {
                Ok(()) => "Si el email existe, recibirás un enlace para restablecer la contraseña"
                    .to_string(),
                Err(e) => failure_message(e.current_context(), "Error al solicitar el restablecimiento"),
            };
            set_message.set(Some(text));
        });
    };

    view! {
        <div class="login-page">
            <div class="login-box">
                <h1>"Recuperar contraseña"</h1>
                <form on:submit=on_submit>
                    <label for="email">"Email"</label>
                    <input id="email" type="email" required bind:value=email/>
                    {move || message.get().map(|msg| view! { <p class="info">{msg}</p> })}
                    <button type="submit" class="login-button">"Enviar enlace"</button>
                </form>
                <p><a href="/login">"Volver a iniciar sesión"</a></p>
            </div>
        </div>
    }
}

#[component]
fn NewPasswordForm(token: String) -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let navigate = use_navigate();
    let password = RwSignal::new(String::new());
    let (error, set_error) = signal(Option::<String>::None);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let client = auth.state().client().clone();
        let navigate = navigate.clone();
        let token = token.clone();
        let new_password = password.get_untracked();

        spawn_local(async move {
            match client.reset_password(&token, &new_password).await {
                Ok(()) => navigate(AppRoute::Login.path(), Default::default()),
                Err(e) => set_error.set(Some(failure_message(
                    e.current_context(),
                    "Error al restablecer la contraseña",
                ))),
            }
        });
    };

    view! {
        <div class="login-page">
            <div class="login-box">
                <h1>"Nueva contraseña"</h1>
                <form on:submit=on_submit>
                    <label for="new-password">"Contraseña"</label>
                    <input id="new-password" type="password" required bind:value=password/>
                    {move || error.get().map(|msg| view! { <p class="error">{msg}</p> })}
                    <button type="submit" class="login-button">"Guardar"</button>
                </form>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_reason_wins_over_fallback() {
        let rejected = SessionError::Rejected {
            status: 400,
            reason: "Token inválido".to_string(),
        };
        assert_eq!(failure_message(&rejected, "fallo"), "Token inválido");

        let unreadable = SessionError::InvalidResponse {
            reason: "eof".to_string(),
        };
        assert_eq!(failure_message(&unreadable, "fallo"), "fallo");
    }
}
