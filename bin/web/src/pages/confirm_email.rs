//! Landing page for the link in the account confirmation email.

use crate::auth::AuthContext;
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params_map;
use taller_session::SessionError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Confirmation {
    Pending,
    Confirmed,
    Failed(String),
}

fn confirmation_failure(error: &SessionError) -> Confirmation {
    match error {
        SessionError::Rejected { reason, .. } if !reason.is_empty() => {
            Confirmation::Failed(reason.clone())
        }
        _ => Confirmation::Failed("Error al confirmar el email".to_string()),
    }
}

/// Confirms the token from the URL once, and offers to resend the email if
/// that fails.
#[component]
pub fn ConfirmEmailPage() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let token = use_params_map()
        .get_untracked()
        .get("token")
        .unwrap_or_default();
    let (status, set_status) = signal(Confirmation::Pending);

    let client = auth.state().client().clone();
    spawn_local(async move {
        if token.is_empty() {
            set_status.set(Confirmation::Failed(
                "Token de confirmación no válido".to_string(),
            ));
            return;
        }
        match client.confirm_email(&token).await {
            Ok(()) => set_status.set(Confirmation::Confirmed),
            Err(e) => set_status.set(confirmation_failure(e.current_context())),
        }
    });

    view! {
        <div class="login-page">
            <div class="login-box">
                <h1>"Confirmar email"</h1>
                {move || match status.get() {
                    Confirmation::Pending => view! { <p>"Confirmando..."</p> }.into_any(),
                    Confirmation::Confirmed => view! {
                        <p>"Tu email ha sido confirmado."</p>
                        <a href="/login" class="link-button">"Iniciar sesión"</a>
                    }
                    .into_any(),
                    Confirmation::Failed(message) => view! {
                        <p class="error">{message}</p>
                        <ResendConfirmation/>
                    }
                    .into_any(),
                }}
            </div>
        </div>
    }
}

#[component]
fn ResendConfirmation() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let email = RwSignal::new(String::new());
    let (message, set_message) = signal(Option::<String>::None);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let client = auth.state().client().clone();
        let address = email.get_untracked();

        spawn_local(async move {
            let text = match client.resend_confirmation(&address).await {
                Ok(()) => "Se ha enviado un nuevo email de confirmación".to_string(),
                Err(e) => {
                    tracing::debug!(error = %e, "resend confirmation failed");
                    "No se pudo reenviar el email".to_string()
                }
            };
            set_message.set(Some(text));
        });
    };

    view! {
        <form on:submit=on_submit>
            <label for="resend-email">"Email"</label>
            <input id="resend-email" type="email" required bind:value=email/>
            {move || message.get().map(|msg| view! { <p class="info">{msg}</p> })}
            <button type="submit" class="login-button">"Reenviar confirmación"</button>
        </form>
    }
}
