//! Session client configuration.
//!
//! Binaries compose this into their own configuration and load it via the
//! `config` crate (e.g. `TALLER__SESSION__API_BASE_URL`). Every field has a
//! default that matches the workshop backend's development setup.

use serde::Deserialize;

/// Configuration for talking to the workshop backend.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Base URL every endpoint path is appended to.
    #[serde(default = "default_api_base_url")]
    api_base_url: String,

    /// Storage key (or file name stem) holding the bearer token.
    #[serde(default = "default_token_key")]
    token_key: String,

    /// Endpoint paths, relative to `api_base_url`.
    #[serde(default)]
    endpoints: EndpointConfig,
}

/// Paths of the authentication endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// Form-encoded credential exchange.
    #[serde(default = "default_login_path")]
    pub login: String,

    /// Bearer-authenticated "who am I".
    #[serde(default = "default_me_path")]
    pub me: String,

    /// Account registration.
    #[serde(default = "default_register_path")]
    pub register: String,

    /// Password change for the signed-in user.
    #[serde(default = "default_change_password_path")]
    pub change_password: String,

    /// Profile update for the signed-in user.
    #[serde(default = "default_profile_path")]
    pub profile: String,

    /// Sends a password reset email.
    #[serde(default = "default_request_password_reset_path")]
    pub request_password_reset: String,

    /// Sets a new password from a reset token.
    #[serde(default = "default_reset_password_path")]
    pub reset_password: String,

    /// Email confirmation; the token is appended as a path segment.
    #[serde(default = "default_confirm_email_path")]
    pub confirm_email: String,

    /// Sends the confirmation email again.
    #[serde(default = "default_resend_confirmation_path")]
    pub resend_confirmation: String,
}

fn default_api_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_token_key() -> String {
    "token".to_string()
}

fn default_login_path() -> String {
    "/auth/login".to_string()
}

fn default_me_path() -> String {
    "/auth/me".to_string()
}

fn default_register_path() -> String {
    "/auth/registro".to_string()
}

fn default_change_password_path() -> String {
    "/auth/change-password".to_string()
}

fn default_profile_path() -> String {
    "/usuarios/me".to_string()
}

fn default_request_password_reset_path() -> String {
    "/auth/request-password-reset".to_string()
}

fn default_reset_password_path() -> String {
    "/auth/reset-password".to_string()
}

fn default_confirm_email_path() -> String {
    "/auth/confirmar-email".to_string()
}

fn default_resend_confirmation_path() -> String {
    "/auth/reenviar-confirmacion".to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            login: default_login_path(),
            me: default_me_path(),
            register: default_register_path(),
            change_password: default_change_password_path(),
            profile: default_profile_path(),
            request_password_reset: default_request_password_reset_path(),
            reset_password: default_reset_password_path(),
            confirm_email: default_confirm_email_path(),
            resend_confirmation: default_resend_confirmation_path(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            token_key: default_token_key(),
            endpoints: EndpointConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Creates a configuration for the given backend base URL.
    #[must_use]
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Replaces the backend base URL, keeping everything else.
    #[must_use]
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    /// Returns the backend base URL.
    #[must_use]
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Returns the token storage key.
    #[must_use]
    pub fn token_key(&self) -> &str {
        &self.token_key
    }

    /// Returns the endpoint paths.
    #[must_use]
    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    /// Joins a path onto the base URL with exactly one slash between them.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_layout() {
        let config = SessionConfig::default();
        assert_eq!(config.api_base_url(), "http://localhost:8000/api");
        assert_eq!(config.token_key(), "token");
        assert_eq!(config.endpoints().login, "/auth/login");
        assert_eq!(config.endpoints().me, "/auth/me");
        assert_eq!(config.endpoints().profile, "/usuarios/me");
        assert_eq!(config.endpoints().confirm_email, "/auth/confirmar-email");
    }

    #[test]
    fn url_joins_without_double_slash() {
        let config = SessionConfig::new("http://api.test/api/");
        assert_eq!(config.url("/auth/me"), "http://api.test/api/auth/me");
        assert_eq!(config.url("vehiculos"), "http://api.test/api/vehiculos");
    }

    #[test]
    fn deserializes_with_partial_endpoints() {
        let json = r#"{
            "api_base_url": "https://taller.example/api",
            "endpoints": { "me": "/usuarios/me" }
        }"#;

        let config: SessionConfig = serde_json::from_str(json).expect("deserialize");

        assert_eq!(config.api_base_url(), "https://taller.example/api");
        assert_eq!(config.token_key(), "token");
        assert_eq!(config.endpoints().me, "/usuarios/me");
        assert_eq!(config.endpoints().login, "/auth/login");
    }
}
