//! HTTP client for the workshop backend's authentication endpoints.
//!
//! The client owns the credential attachment: the bearer token sent with
//! authorized requests, plus an epoch counter bumped on every credential
//! change. Operations that suspend on the network capture the epoch before
//! sending and only commit if it is unchanged when they resume, so a logout
//! always wins over a login or restore that was still in flight.

use crate::config::SessionConfig;
use crate::credential::{CredentialStore, clear_or_warn, read_or_absent};
use crate::error::SessionError;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use taller_core::Result;
use taller_platform_access::{Identity, Role};
use tracing::{debug, info, instrument, warn};

/// Callback run after a 401 dropped the session.
pub type ExpiryListener = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Default)]
struct Attachment {
    epoch: u64,
    token: Option<String>,
}

struct ClientInner {
    http: reqwest::Client,
    config: SessionConfig,
    store: Arc<dyn CredentialStore>,
    attachment: Mutex<Attachment>,
    listeners: Mutex<Vec<ExpiryListener>>,
}

/// Session client for the workshop backend.
///
/// Cheap to clone; clones share the attachment, store and listeners.
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    user: Identity,
}

/// Data for creating a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    full_name: String,
    email: String,
    password: String,
    phone: Option<String>,
    address: Option<String>,
    role: Role,
}

impl NewAccount {
    /// Creates a customer account request.
    #[must_use]
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            password: password.into(),
            phone: None,
            address: None,
            role: Role::Cliente,
        }
    }

    /// Sets the contact phone.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the postal address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Requests a role other than customer. The backend decides whether to
    /// honor it.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Splits the full name into given name and family names.
    ///
    /// The first word is the given name; everything after it is the surname.
    fn split_name(&self) -> (String, String) {
        let mut words = self.full_name.split_whitespace();
        let given = words.next().unwrap_or_default().to_string();
        let surname = words.collect::<Vec<_>>().join(" ");
        (given, surname)
    }
}

#[derive(Serialize)]
struct RegisterPayload<'a> {
    nombre: String,
    apellidos: String,
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    telefono: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    direccion: Option<&'a str>,
    rol: Role,
}

impl<'a> From<&'a NewAccount> for RegisterPayload<'a> {
    fn from(account: &'a NewAccount) -> Self {
        let (nombre, apellidos) = account.split_name();
        Self {
            nombre,
            apellidos,
            email: &account.email,
            password: &account.password,
            telefono: account.phone.as_deref(),
            direccion: account.address.as_deref(),
            rol: account.role,
        }
    }
}

#[derive(Serialize)]
struct ChangePasswordPayload<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

#[derive(Serialize)]
struct EmailPayload<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct ResetPasswordPayload<'a> {
    token: &'a str,
    new_password: &'a str,
}

/// Changes to the signed-in user's own profile.
///
/// Fields left unset are not sent and keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(rename = "apellido", skip_serializing_if = "Option::is_none")]
    surname: Option<String>,
    #[serde(rename = "telefono", skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    #[serde(rename = "direccion", skip_serializing_if = "Option::is_none")]
    address: Option<String>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_surname(mut self, surname: impl Into<String>) -> Self {
        self.surname = Some(surname.into());
        self
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Returns true if nothing would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.surname.is_none()
            && self.phone.is_none()
            && self.address.is_none()
    }
}

fn transport(e: reqwest::Error) -> SessionError {
    SessionError::Transport {
        reason: e.to_string(),
    }
}

fn invalid_response(e: reqwest::Error) -> SessionError {
    SessionError::InvalidResponse {
        reason: e.to_string(),
    }
}

/// Pulls a human-readable message out of a backend error body.
///
/// Accepts `detail` as a string or as a list of validation errors, and the
/// `message` / `error` keys some endpoints use instead.
fn error_detail(body: &Value) -> Option<String> {
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| match body.get(key)? {
            Value::String(message) => Some(message.clone()),
            Value::Array(items) => items
                .iter()
                .find_map(|item| item.get("msg").and_then(Value::as_str))
                .map(str::to_string),
            _ => None,
        })
}

async fn response_detail(response: Response) -> Option<String> {
    let body: Value = response.json().await.ok()?;
    error_detail(&body)
}

async fn rejected(response: Response) -> SessionError {
    let status = response.status();
    let reason = response_detail(response)
        .await
        .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
    SessionError::Rejected {
        status: status.as_u16(),
        reason,
    }
}

/// Sends an unauthenticated request, accepting any 2xx answer.
async fn send_public(builder: reqwest::RequestBuilder) -> Result<(), SessionError> {
    let response = builder.send().await.map_err(transport)?;
    if !response.status().is_success() {
        return Err(rejected(response).await.into());
    }
    Ok(())
}

impl SessionClient {
    /// Creates a client for the configured backend.
    ///
    /// The store is not read here; call [`Self::restore_session`] for that.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: SessionConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, SessionError> {
        let http = reqwest::Client::builder().build().map_err(transport)?;
        Ok(Self::with_http_client(http, config, store))
    }

    /// Creates a client around an existing `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(
        http: reqwest::Client,
        config: SessionConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http,
                config,
                store,
                attachment: Mutex::new(Attachment::default()),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    fn attachment(&self) -> MutexGuard<'_, Attachment> {
        self.inner
            .attachment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn current_epoch(&self) -> u64 {
        self.attachment().epoch
    }

    /// Returns the bearer token currently attached to outgoing requests.
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.attachment().token.clone()
    }

    /// Returns whether a bearer token is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attachment().token.is_some()
    }

    /// Registers a callback run whenever a 401 drops the session.
    pub fn on_session_expired(&self, listener: impl Fn() + Send + Sync + 'static) {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Exchanges credentials for a bearer token and the user's identity.
    ///
    /// On success the token is persisted and attached. On any failure
    /// nothing is committed.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailed` if the backend rejects the credentials
    /// - `Transport` / `InvalidResponse` if the exchange itself fails
    /// - `Superseded` if a logout happened while the call was in flight
    #[instrument(skip(self, secret))]
    pub async fn login(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<Identity, SessionError> {
        let epoch = self.current_epoch();
        let url = self.inner.config.url(&self.inner.config.endpoints().login);

        let response = self
            .inner
            .http
            .post(url)
            .form(&[
                ("username", identifier),
                ("password", secret),
                ("grant_type", "password"),
            ])
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status.is_client_error() {
            let reason = response_detail(response).await.unwrap_or_default();
            debug!(%status, "login rejected");
            return Err(SessionError::AuthenticationFailed { reason }.into());
        }
        if !status.is_success() {
            return Err(rejected(response).await.into());
        }

        let body: LoginResponse = response.json().await.map_err(invalid_response)?;
        if let Some(token_type) = body
            .token_type
            .as_deref()
            .filter(|t| !t.eq_ignore_ascii_case("bearer"))
        {
            debug!(token_type, "unexpected token type, sending as bearer anyway");
        }

        self.commit(epoch, body.access_token)?;
        info!(user_id = %body.user.id(), role = %body.user.role(), "logged in");
        Ok(body.user)
    }

    /// Attaches and persists `token` if no credential change happened since
    /// `epoch` was read.
    fn commit(&self, epoch: u64, token: String) -> std::result::Result<(), SessionError> {
        let mut attachment = self.attachment();
        if attachment.epoch != epoch {
            debug!(epoch, current = attachment.epoch, "login superseded");
            return Err(SessionError::Superseded);
        }
        if let Err(e) = self.inner.store.save(&token) {
            warn!(error = %e, "failed to persist token, session will not survive a restart");
        }
        attachment.token = Some(token);
        attachment.epoch += 1;
        Ok(())
    }

    /// Drops the credential locally. Always succeeds; the backend is not
    /// contacted.
    pub fn logout(&self) {
        let mut attachment = self.attachment();
        attachment.epoch += 1;
        attachment.token = None;
        clear_or_warn(self.inner.store.as_ref());
        info!("logged out");
    }

    /// Drops the session if no credential change happened since `epoch`.
    ///
    /// Returns whether the session was dropped. Listeners run after the
    /// attachment lock is released.
    fn expire(&self, epoch: u64) -> bool {
        {
            let mut attachment = self.attachment();
            if attachment.epoch != epoch {
                debug!(epoch, current = attachment.epoch, "ignoring 401 from an older session");
                return false;
            }
            attachment.epoch += 1;
            attachment.token = None;
            clear_or_warn(self.inner.store.as_ref());
        }
        warn!("session expired, credential dropped");

        let listeners = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener();
        }
        true
    }

    /// Turns the stored token back into an identity.
    ///
    /// Returns `None` when there is no token, when the backend refuses it,
    /// or when the session changed while the check was in flight. A refused
    /// token is removed from the store. Failures are logged, never returned.
    #[instrument(skip(self))]
    pub async fn restore_session(&self) -> Option<Identity> {
        let token = read_or_absent(self.inner.store.as_ref())?;
        let epoch = {
            let mut attachment = self.attachment();
            attachment.token = Some(token.clone());
            attachment.epoch
        };

        match self.fetch_me(&token).await {
            Ok(identity) if self.current_epoch() == epoch => {
                debug!(user_id = %identity.id(), "session restored");
                Some(identity)
            }
            Ok(_) => {
                debug!("session changed during restore, discarding result");
                None
            }
            Err(e) => {
                let e = SessionError::RestoreFailed {
                    reason: e.to_string(),
                };
                warn!(error = %e, "dropping stored token");
                let mut attachment = self.attachment();
                if attachment.epoch == epoch && attachment.token.as_deref() == Some(token.as_str())
                {
                    attachment.token = None;
                    clear_or_warn(self.inner.store.as_ref());
                }
                None
            }
        }
    }

    async fn fetch_me(&self, token: &str) -> std::result::Result<Identity, SessionError> {
        let url = self.inner.config.url(&self.inner.config.endpoints().me);
        let response = self
            .inner
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(rejected(response).await);
        }
        response.json().await.map_err(invalid_response)
    }

    /// Creates a new account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` with the backend's message if registration is
    /// refused, or `Transport` / `InvalidResponse` on exchange failures.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn register(&self, account: &NewAccount) -> Result<Identity, SessionError> {
        let url = self.inner.config.url(&self.inner.config.endpoints().register);
        let response = self
            .inner
            .http
            .post(url)
            .json(&RegisterPayload::from(account))
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(rejected(response).await.into());
        }
        let identity: Identity = response.json().await.map_err(invalid_response)?;
        info!(user_id = %identity.id(), "account registered");
        Ok(identity)
    }

    /// Changes the signed-in user's password.
    ///
    /// # Errors
    ///
    /// Returns `SessionExpired` if the session was no longer valid, or
    /// `Rejected` if the backend refused the change.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        current: &str,
        new: &str,
    ) -> Result<(), SessionError> {
        let path = self.inner.config.endpoints().change_password.clone();
        self.post(&path)
            .json(&ChangePasswordPayload {
                current_password: current,
                new_password: new,
            })
            .send()
            .await?;
        Ok(())
    }

    /// Updates the signed-in user's profile and returns the stored result.
    ///
    /// # Errors
    ///
    /// Returns `SessionExpired` if the session was no longer valid, or
    /// `Rejected` if the backend refused the update.
    #[instrument(skip_all)]
    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<Identity, SessionError> {
        let path = self.inner.config.endpoints().profile.clone();
        let identity: Identity = self.put(&path).json(update).send_json().await?;
        info!(user_id = %identity.id(), "profile updated");
        Ok(identity)
    }

    /// Asks the backend to email a password reset link to `email`.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` if the backend refused, or `Transport` if it could
    /// not be reached.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<(), SessionError> {
        let url = self.inner.config.url(&self.inner.config.endpoints().request_password_reset);
        send_public(self.inner.http.post(url).json(&EmailPayload { email })).await
    }

    /// Sets a new password using the token from a reset email.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` for an invalid or expired token.
    #[instrument(skip_all)]
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), SessionError> {
        let url = self.inner.config.url(&self.inner.config.endpoints().reset_password);
        send_public(
            self.inner
                .http
                .post(url)
                .json(&ResetPasswordPayload { token, new_password }),
        )
        .await?;
        info!("password reset");
        Ok(())
    }

    /// Confirms an account's email with the token from the confirmation mail.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` for an invalid or expired token.
    #[instrument(skip_all)]
    pub async fn confirm_email(&self, token: &str) -> Result<(), SessionError> {
        let endpoints = self.inner.config.endpoints();
        let path = format!(
            "{}/{}",
            endpoints.confirm_email.trim_end_matches('/'),
            urlencoding::encode(token)
        );
        send_public(self.inner.http.post(self.inner.config.url(&path))).await
    }

    /// Sends the confirmation email for `email` again.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` if the backend refused.
    #[instrument(skip(self))]
    pub async fn resend_confirmation(&self, email: &str) -> Result<(), SessionError> {
        let url = self.inner.config.url(&self.inner.config.endpoints().resend_confirmation);
        send_public(self.inner.http.post(url).json(&EmailPayload { email })).await
    }

    /// Starts an authorized request to `path` under the current credential.
    #[must_use]
    pub fn request(&self, method: Method, path: &str) -> AuthorizedRequest {
        let (epoch, token) = {
            let attachment = self.attachment();
            (attachment.epoch, attachment.token.clone())
        };
        let mut builder = self.inner.http.request(method, self.inner.config.url(path));
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        AuthorizedRequest {
            client: self.clone(),
            builder,
            epoch,
        }
    }

    /// Starts an authorized GET.
    #[must_use]
    pub fn get(&self, path: &str) -> AuthorizedRequest {
        self.request(Method::GET, path)
    }

    /// Starts an authorized POST.
    #[must_use]
    pub fn post(&self, path: &str) -> AuthorizedRequest {
        self.request(Method::POST, path)
    }

    /// Starts an authorized PUT.
    #[must_use]
    pub fn put(&self, path: &str) -> AuthorizedRequest {
        self.request(Method::PUT, path)
    }

    /// Starts an authorized DELETE.
    #[must_use]
    pub fn delete(&self, path: &str) -> AuthorizedRequest {
        self.request(Method::DELETE, path)
    }
}

/// A request carrying the bearer token of the session it was built under.
///
/// A 401 answer drops that session, unless the credential has changed since.
#[must_use = "requests do nothing until sent"]
pub struct AuthorizedRequest {
    client: SessionClient,
    builder: reqwest::RequestBuilder,
    epoch: u64,
}

impl AuthorizedRequest {
    /// Sets a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.builder = self.builder.json(body);
        self
    }

    /// Sets a form-encoded body.
    pub fn form<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.builder = self.builder.form(body);
        self
    }

    /// Appends query parameters.
    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Self {
        self.builder = self.builder.query(query);
        self
    }

    /// Sends the request.
    ///
    /// # Errors
    ///
    /// - `SessionExpired` on 401; the session is dropped as a side effect
    /// - `Rejected` on any other non-2xx status
    /// - `Transport` if no answer arrived
    pub async fn send(self) -> Result<Response, SessionError> {
        let response = self.builder.send().await.map_err(transport)?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.client.expire(self.epoch);
            return Err(SessionError::SessionExpired.into());
        }
        if !status.is_success() {
            return Err(rejected(response).await.into());
        }
        Ok(response)
    }

    /// Sends the request and decodes a JSON answer.
    ///
    /// # Errors
    ///
    /// As [`Self::send`], plus `InvalidResponse` if the body does not decode.
    pub async fn send_json<T: DeserializeOwned>(self) -> Result<T, SessionError> {
        let response = self.send().await?;
        Ok(response.json().await.map_err(invalid_response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::MemoryCredentialStore;
    use crate::test_support::{FailingStore, client_for, mount_login, mount_me, user_json};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn login_persists_and_attaches_token() {
        let server = MockServer::start().await;
        mount_login(&server, "abc", user_json(1, "Ana", "cliente")).await;
        let store = Arc::new(MemoryCredentialStore::new());
        let client = client_for(&server, store.clone());

        let identity = client.login("ana@example.com", "secret").await.expect("login");

        assert_eq!(identity.role(), Role::Cliente);
        assert_eq!(identity.name(), Some("Ana"));
        assert_eq!(store.read().expect("read"), Some("abc".to_string()));
        assert_eq!(client.bearer(), Some("abc".to_string()));
    }

    #[tokio::test]
    async fn login_sends_form_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_string_contains("username=ana%40example.com"))
            .and(body_string_contains("grant_type=password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "abc",
                "token_type": "bearer",
                "user": user_json(1, "Ana", "CLIENTE"),
            })))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));

        client.login("ana@example.com", "secret").await.expect("login");
    }

    #[tokio::test]
    async fn rejected_login_commits_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "detail": "Email o contraseña incorrectos" })),
            )
            .mount(&server)
            .await;
        let store = Arc::new(MemoryCredentialStore::new());
        let client = client_for(&server, store.clone());

        let err = client.login("ana@example.com", "wrong").await.unwrap_err();

        assert_eq!(
            err.current_context(),
            &SessionError::AuthenticationFailed {
                reason: "Email o contraseña incorrectos".to_string()
            }
        );
        assert_eq!(store.read().expect("read"), None);
        assert!(!client.is_attached());
    }

    #[tokio::test]
    async fn malformed_login_answer_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;
        let store = Arc::new(MemoryCredentialStore::new());
        let client = client_for(&server, store.clone());

        let err = client.login("ana@example.com", "secret").await.unwrap_err();

        assert!(matches!(
            err.current_context(),
            SessionError::InvalidResponse { .. }
        ));
        assert_eq!(store.read().expect("read"), None);
    }

    #[tokio::test]
    async fn login_resolving_after_logout_commits_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({
                        "access_token": "abc",
                        "user": user_json(1, "Ana", "CLIENTE"),
                    }))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;
        let store = Arc::new(MemoryCredentialStore::new());
        let client = client_for(&server, store.clone());

        let (result, ()) = tokio::join!(client.login("ana@example.com", "secret"), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            client.logout();
        });

        let err = result.unwrap_err();
        assert_eq!(err.current_context(), &SessionError::Superseded);
        assert_eq!(store.read().expect("read"), None);
        assert!(!client.is_attached());
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let server = MockServer::start().await;
        mount_login(&server, "abc", user_json(1, "Ana", "CLIENTE")).await;
        let store = Arc::new(MemoryCredentialStore::new());
        let client = client_for(&server, store.clone());
        client.login("ana@example.com", "secret").await.expect("login");

        client.logout();

        assert_eq!(store.read().expect("read"), None);
        assert!(!client.is_attached());

        // Logging out again is harmless.
        client.logout();
        assert!(!client.is_attached());
    }

    #[tokio::test]
    async fn logout_survives_broken_store() {
        let server = MockServer::start().await;
        let client = client_for(&server, Arc::new(FailingStore));
        client.logout();
        assert!(!client.is_attached());
    }

    #[tokio::test]
    async fn restore_with_valid_token_is_idempotent() {
        let server = MockServer::start().await;
        mount_me(&server, "abc", user_json(1, "Ana", "cliente")).await;
        let client = client_for(&server, Arc::new(MemoryCredentialStore::with_token("abc")));

        let first = client.restore_session().await.expect("restored");
        let second = client.restore_session().await.expect("restored again");

        assert_eq!(first, second);
        assert_eq!(first.role(), Role::Cliente);
        assert_eq!(client.bearer(), Some("abc".to_string()));
    }

    #[tokio::test]
    async fn restore_with_rejected_token_clears_store() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let store = Arc::new(MemoryCredentialStore::with_token("stale"));
        let client = client_for(&server, store.clone());

        assert_eq!(client.restore_session().await, None);
        assert_eq!(store.read().expect("read"), None);
        assert!(!client.is_attached());

        assert_eq!(client.restore_session().await, None);
    }

    #[tokio::test]
    async fn restore_without_token_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));

        assert_eq!(client.restore_session().await, None);
    }

    #[tokio::test]
    async fn restore_with_unreadable_store_is_absent() {
        let server = MockServer::start().await;
        let client = client_for(&server, Arc::new(FailingStore));
        assert_eq!(client.restore_session().await, None);
    }

    #[tokio::test]
    async fn authorized_request_carries_bearer() {
        let server = MockServer::start().await;
        mount_login(&server, "abc", user_json(1, "Ana", "CLIENTE")).await;
        Mock::given(method("GET"))
            .and(path("/vehiculos"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 7 }])))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));
        client.login("ana@example.com", "secret").await.expect("login");

        let vehicles: Vec<Value> = client.get("/vehiculos").send_json().await.expect("vehicles");

        assert_eq!(vehicles.len(), 1);
    }

    #[tokio::test]
    async fn unauthorized_answer_expires_session_and_notifies() {
        let server = MockServer::start().await;
        mount_login(&server, "abc", user_json(1, "Ana", "CLIENTE")).await;
        Mock::given(method("GET"))
            .and(path("/citas"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let store = Arc::new(MemoryCredentialStore::new());
        let client = client_for(&server, store.clone());
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = notified.clone();
        client.on_session_expired(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        client.login("ana@example.com", "secret").await.expect("login");

        let err = client.get("/citas").send().await.unwrap_err();

        assert_eq!(err.current_context(), &SessionError::SessionExpired);
        assert_eq!(store.read().expect("read"), None);
        assert!(!client.is_attached());
        assert_eq!(notified.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_unauthorized_answer_keeps_newer_session() {
        let server = MockServer::start().await;
        mount_login(&server, "abc", user_json(1, "Ana", "CLIENTE")).await;
        Mock::given(method("GET"))
            .and(path("/citas"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let store = Arc::new(MemoryCredentialStore::new());
        let client = client_for(&server, store.clone());

        let stale = client.get("/citas");
        client.login("ana@example.com", "secret").await.expect("login");
        let err = stale.send().await.unwrap_err();

        assert_eq!(err.current_context(), &SessionError::SessionExpired);
        assert_eq!(store.read().expect("read"), Some("abc".to_string()));
        assert!(client.is_attached());
    }

    #[tokio::test]
    async fn other_error_statuses_are_rejected_without_logout() {
        let server = MockServer::start().await;
        mount_login(&server, "abc", user_json(1, "Ana", "ADMIN")).await;
        Mock::given(method("DELETE"))
            .and(path("/servicios/3"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "detail": "Servicio no encontrado" })),
            )
            .mount(&server)
            .await;
        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));
        client.login("admin@example.com", "secret").await.expect("login");

        let err = client.delete("/servicios/3").send().await.unwrap_err();

        assert_eq!(
            err.current_context(),
            &SessionError::Rejected {
                status: 404,
                reason: "Servicio no encontrado".to_string()
            }
        );
        assert!(client.is_attached());
    }

    #[tokio::test]
    async fn register_splits_name_and_defaults_role() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/registro"))
            .and(body_json(json!({
                "nombre": "Ana",
                "apellidos": "García López",
                "email": "ana@example.com",
                "password": "secret",
                "telefono": "600000000",
                "rol": "CLIENTE",
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(user_json(5, "Ana", "CLIENTE")))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));
        let account = NewAccount::new("  Ana García  López ", "ana@example.com", "secret")
            .with_phone("600000000");

        let identity = client.register(&account).await.expect("register");

        assert_eq!(identity.id().get(), 5);
        assert!(!client.is_attached());
    }

    #[tokio::test]
    async fn register_rejection_carries_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/registro"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "detail": "El email ya está registrado" })),
            )
            .mount(&server)
            .await;
        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));

        let err = client
            .register(&NewAccount::new("Ana", "ana@example.com", "secret"))
            .await
            .unwrap_err();

        assert_eq!(
            err.current_context(),
            &SessionError::Rejected {
                status: 400,
                reason: "El email ya está registrado".to_string()
            }
        );
    }

    #[tokio::test]
    async fn change_password_goes_through_interceptor() {
        let server = MockServer::start().await;
        mount_login(&server, "abc", user_json(1, "Ana", "CLIENTE")).await;
        Mock::given(method("POST"))
            .and(path("/auth/change-password"))
            .and(header("authorization", "Bearer abc"))
            .and(body_json(json!({ "current_password": "old", "new_password": "new" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));
        client.login("ana@example.com", "secret").await.expect("login");

        client.change_password("old", "new").await.expect("changed");
    }

    #[tokio::test]
    async fn update_profile_sends_changed_fields_only() {
        let server = MockServer::start().await;
        mount_login(&server, "abc", user_json(1, "Ana", "CLIENTE")).await;
        let mut updated = user_json(1, "Anabel", "CLIENTE");
        updated["telefono"] = json!("600111222");
        Mock::given(method("PUT"))
            .and(path("/usuarios/me"))
            .and(header("authorization", "Bearer abc"))
            .and(body_json(json!({ "nombre": "Anabel", "telefono": "600111222" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(updated))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));
        client.login("ana@example.com", "secret").await.expect("login");

        let update = ProfileUpdate::new().with_name("Anabel").with_phone("600111222");
        let identity = client.update_profile(&update).await.expect("update");

        assert_eq!(identity.name(), Some("Anabel"));
        assert_eq!(identity.phone(), Some("600111222"));
    }

    #[tokio::test]
    async fn update_profile_with_expired_session_signs_out() {
        let server = MockServer::start().await;
        mount_login(&server, "abc", user_json(1, "Ana", "CLIENTE")).await;
        Mock::given(method("PUT"))
            .and(path("/usuarios/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));
        client.login("ana@example.com", "secret").await.expect("login");

        let err = client
            .update_profile(&ProfileUpdate::new().with_address("Calle Mayor 1"))
            .await
            .unwrap_err();

        assert_eq!(err.current_context(), &SessionError::SessionExpired);
        assert!(!client.is_attached());
    }

    #[test]
    fn empty_profile_update_serializes_to_empty_object() {
        let update = ProfileUpdate::new();
        assert!(update.is_empty());
        assert_eq!(serde_json::to_value(&update).expect("serialize"), json!({}));
    }

    #[tokio::test]
    async fn password_reset_requests_are_unauthenticated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/request-password-reset"))
            .and(body_json(json!({ "email": "ana@example.com" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/reset-password"))
            .and(body_json(json!({ "token": "t0k", "new_password": "nueva" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));

        client
            .request_password_reset("ana@example.com")
            .await
            .expect("reset requested");
        client.reset_password("t0k", "nueva").await.expect("reset");

        let received = server.received_requests().await.expect("recording");
        assert!(received.iter().all(|r| !r.headers.contains_key("authorization")));
    }

    #[tokio::test]
    async fn invalid_reset_token_is_rejected_with_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/reset-password"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "detail": "Token inválido" })),
            )
            .mount(&server)
            .await;
        let client = client_for(&server, Arc::new(MemoryCredentialStore::with_token("abc")));

        let err = client.reset_password("caducado", "nueva").await.unwrap_err();

        assert_eq!(
            err.current_context(),
            &SessionError::Rejected {
                status: 400,
                reason: "Token inválido".to_string()
            }
        );
    }

    #[tokio::test]
    async fn confirm_email_posts_token_in_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/confirmar-email/tok-123"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/reenviar-confirmacion"))
            .and(body_json(json!({ "email": "ana@example.com" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));

        client.confirm_email("tok-123").await.expect("confirmed");
        client
            .resend_confirmation("ana@example.com")
            .await
            .expect("resent");
    }

    #[test]
    fn error_detail_reads_validation_lists() {
        let body = json!({ "detail": [{ "loc": ["body", "email"], "msg": "field required" }] });
        assert_eq!(error_detail(&body), Some("field required".to_string()));

        let flask = json!({ "error": "Usuario inactivo" });
        assert_eq!(error_detail(&flask), Some("Usuario inactivo".to_string()));

        assert_eq!(error_detail(&json!({ "status": "fail" })), None);
    }
}
