//! Own profile page, open to every signed-in role.

use crate::auth::AuthContext;
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use taller_session::{ProfileUpdate, SessionError};

/// Profile details, the edit form and the password change form.
#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let snapshot = auth.snapshot();

    view! {
        <div class="settings-page">
            <h1>"Mi perfil"</h1>
            {move || {
                snapshot.get().identity().cloned().map(|identity| view! {
                    <section class="settings-section">
                        <div class="setting-row">
                            <label>"Nombre"</label>
                            <span>{identity.display_name()}</span>
                        </div>
                        <div class="setting-row">
                            <label>"Email"</label>
                            <span>{identity.email().to_string()}</span>
                        </div>
                        <div class="setting-row">
                            <label>"Teléfono"</label>
                            <span>{identity.phone().unwrap_or("No indicado").to_string()}</span>
                        </div>
                        <div class="setting-row">
                            <label>"Dirección"</label>
                            <span>{identity.address().unwrap_or("No indicada").to_string()}</span>
                        </div>
                        <div class="setting-row">
                            <label>"Rol"</label>
                            <span>{identity.role().to_string()}</span>
                        </div>
                    </section>
                })
            }}
            <EditProfile/>
            <ChangePassword/>
        </div>
    }
}

/// Builds an update from the form fields, sending only the non-blank ones.
fn profile_update(name: &str, surname: &str, phone: &str, address: &str) -> ProfileUpdate {
    let mut update = ProfileUpdate::new();
    if !name.trim().is_empty() {
        update = update.with_name(name.trim());
    }
    if !surname.trim().is_empty() {
        update = update.with_surname(surname.trim());
    }
    if !phone.trim().is_empty() {
        update = update.with_phone(phone.trim());
    }
    if !address.trim().is_empty() {
        update = update.with_address(address.trim());
    }
    update
}

#[component]
fn EditProfile() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let current = auth.state().identity();
    let field = |value: Option<&str>| RwSignal::new(value.unwrap_or_default().to_string());
    let name = field(current.as_ref().and_then(|i| i.name()));
    let surname = field(current.as_ref().and_then(|i| i.surname()));
    let phone = field(current.as_ref().and_then(|i| i.phone()));
    let address = field(current.as_ref().and_then(|i| i.address()));
    let (message, set_message) = signal(Option::<String>::None);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let update = profile_update(
            &name.get_untracked(),
            &surname.get_untracked(),
            &phone.get_untracked(),
            &address.get_untracked(),
        );
        if update.is_empty() {
            return;
        }
        let state = auth.state().clone();

        spawn_local(async move {
            match state.update_profile(&update).await {
                Ok(_) => set_message.set(Some("Perfil actualizado".to_string())),
                Err(e) if matches!(e.current_context(), SessionError::SessionExpired) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "profile update failed");
                    set_message.set(Some("Error al actualizar perfil".to_string()));
                }
            }
        });
    };

    view! {
        <section class="settings-section">
            <h2>"Editar perfil"</h2>
            <form on:submit=on_submit>
                <div class="setting-row">
                    <label for="profile-name">"Nombre"</label>
                    <input id="profile-name" type="text" bind:value=name/>
                </div>
                <div class="setting-row">
                    <label for="profile-surname">"Apellidos"</label>
                    <input id="profile-surname" type="text" bind:value=surname/>
                </div>
                <div class="setting-row">
                    <label for="profile-phone">"Teléfono"</label>
                    <input id="profile-phone" type="tel" bind:value=phone/>
                </div>
                <div class="setting-row">
                    <label for="profile-address">"Dirección"</label>
                    <input id="profile-address" type="text" bind:value=address/>
                </div>
                <div class="setting-row">
                    <button type="submit" class="save-button">"Guardar"</button>
                    {move || message.get().map(|msg| view! { <span class="save-message">{msg}</span> })}
                </div>
            </form>
        </section>
    }
}

#[component]
fn ChangePassword() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let current = RwSignal::new(String::new());
    let new = RwSignal::new(String::new());
    let (message, set_message) = signal(Option::<String>::None);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let client = auth.state().client().clone();
        let current_value = current.get_untracked();
        let new_value = new.get_untracked();

        spawn_local(async move {
            match client.change_password(&current_value, &new_value).await {
                Ok(()) => {
                    current.set(String::new());
                    new.set(String::new());
                    set_message.set(Some("Contraseña actualizada".to_string()));
                }
                // The guard takes over and sends the user to the login page.
                Err(e) if matches!(e.current_context(), SessionError::SessionExpired) => {}
                Err(e) => {
                    let text = match e.current_context() {
                        SessionError::Rejected { reason, .. } if !reason.is_empty() => {
                            reason.clone()
                        }
                        _ => "No se pudo cambiar la contraseña".to_string(),
                    };
                    set_message.set(Some(text));
                }
            }
        });
    };

    view! {
        <section class="settings-section">
            <h2>"Cambiar contraseña"</h2>
            <form on:submit=on_submit>
                <div class="setting-row">
                    <label for="current-password">"Contraseña actual"</label>
                    <input id="current-password" type="password" required bind:value=current/>
                </div>
                <div class="setting-row">
                    <label for="new-password">"Nueva contraseña"</label>
                    <input id="new-password" type="password" required bind:value=new/>
                </div>
                <div class="setting-row">
                    <button type="submit" class="save-button">"Guardar"</button>
                    {move || message.get().map(|msg| view! { <span class="save-message">{msg}</span> })}
                </div>
            </form>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_left_out_of_the_update() {
        let update = profile_update(" Anabel ", "", "  ", "Calle Mayor 1");

        assert_eq!(
            update,
            ProfileUpdate::new()
                .with_name("Anabel")
                .with_address("Calle Mayor 1")
        );
        assert!(profile_update("", " ", "", "").is_empty());
    }
}
