//! CLI configuration.
//!
//! Loaded via the `config` crate from environment variables prefixed with
//! `TALLER`, using `__` as the separator: `TALLER__CREDENTIAL_PATH`,
//! `TALLER__SESSION__API_BASE_URL`, `TALLER__SESSION__TOKEN_KEY`, ...

use serde::Deserialize;
use std::path::PathBuf;
use taller_session::SessionConfig;

/// CLI configuration composed from the session config.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Backend session configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// File the bearer token is kept in between invocations.
    #[serde(default = "default_credential_path")]
    pub credential_path: PathBuf,
}

fn default_credential_path() -> PathBuf {
    PathBuf::from(".taller").join("token")
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            credential_path: default_credential_path(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but malformed.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("TALLER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Points the session at a different backend.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.session = self.session.with_api_base_url(url);
        self
    }

    /// Keeps the token somewhere else.
    #[must_use]
    pub fn with_credential_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credential_path = path.into();
        self
    }
}
