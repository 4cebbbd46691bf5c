//! Shared fixtures for the session crate's tests.

use crate::client::SessionClient;
use crate::config::SessionConfig;
use crate::credential::CredentialStore;
use crate::error::CredentialError;
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A store whose every operation fails.
pub struct FailingStore;

impl CredentialStore for FailingStore {
    fn save(&self, _token: &str) -> Result<(), CredentialError> {
        Err(unavailable())
    }

    fn read(&self) -> Result<Option<String>, CredentialError> {
        Err(unavailable())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        Err(unavailable())
    }
}

fn unavailable() -> CredentialError {
    CredentialError::StorageUnavailable {
        reason: "storage disabled".to_string(),
    }
}

/// A user as the backend serializes it.
pub fn user_json(id: i64, nombre: &str, rol: &str) -> Value {
    json!({
        "id": id,
        "nombre": nombre,
        "apellidos": "García",
        "email": format!("{}@example.com", nombre.to_lowercase()),
        "telefono": null,
        "rol": rol,
        "es_activo": true,
    })
}

/// Builds a client pointed at the mock backend.
pub fn client_for(server: &MockServer, store: Arc<dyn CredentialStore>) -> SessionClient {
    SessionClient::new(SessionConfig::new(server.uri()), store).expect("client")
}

/// Answers every login with `token` and `user`.
pub async fn mount_login(server: &MockServer, token: &str, user: Value) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "bearer",
            "user": user,
        })))
        .mount(server)
        .await;
}

/// Answers `/auth/me` with `user` when called with `token`.
pub async fn mount_me(server: &MockServer, token: &str, user: Value) {
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(user))
        .mount(server)
        .await;
}
