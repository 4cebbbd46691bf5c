//! Error types for the session crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `CredentialError`: Failures of the persistent token store
//! - `SessionError`: Failures of session operations and authorized calls

use std::fmt;

/// Errors from credential store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The backing storage could not be read or written.
    StorageUnavailable { reason: String },
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageUnavailable { reason } => {
                write!(f, "credential storage unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for CredentialError {}

/// Errors from session operations.
///
/// Only `AuthenticationFailed` is meant for the user's eyes. The rest are
/// either recovered by the session itself (`SessionExpired`,
/// `RestoreFailed`, `StorageUnavailable`) or reported to the caller of an
/// authorized request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The backend rejected the credentials.
    AuthenticationFailed { reason: String },
    /// An authorized call was answered with 401; the session was dropped.
    SessionExpired,
    /// The stored token could not be turned back into an identity.
    RestoreFailed { reason: String },
    /// The credential store failed; the token is treated as absent.
    StorageUnavailable { reason: String },
    /// The request never got an HTTP answer.
    Transport { reason: String },
    /// The backend answered with a body the client cannot read.
    InvalidResponse { reason: String },
    /// The backend answered an authorized call with a non-401 error status.
    Rejected { status: u16, reason: String },
    /// A logout happened while the login was in flight; nothing was kept.
    Superseded,
}

impl SessionError {
    /// Message suitable for showing on the login form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthenticationFailed { reason } if !reason.is_empty() => reason.clone(),
            Self::AuthenticationFailed { .. } => "Credenciales incorrectas".to_string(),
            Self::Transport { .. } => "No se pudo contactar con el servidor".to_string(),
            Self::SessionExpired => "La sesión ha caducado".to_string(),
            _ => "Error al iniciar sesión".to_string(),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "authentication failed: {reason}")
            }
            Self::SessionExpired => write!(f, "session expired"),
            Self::RestoreFailed { reason } => {
                write!(f, "session restore failed: {reason}")
            }
            Self::StorageUnavailable { reason } => {
                write!(f, "credential storage unavailable: {reason}")
            }
            Self::Transport { reason } => write!(f, "transport error: {reason}"),
            Self::InvalidResponse { reason } => {
                write!(f, "invalid response from backend: {reason}")
            }
            Self::Rejected { status, reason } => {
                write!(f, "request rejected with status {status}: {reason}")
            }
            Self::Superseded => write!(f, "login superseded by logout"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<CredentialError> for SessionError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::StorageUnavailable { reason } => Self::StorageUnavailable { reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_error_display() {
        let err = CredentialError::StorageUnavailable {
            reason: "quota exceeded".to_string(),
        };
        assert!(err.to_string().contains("unavailable"));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn rejected_display_includes_status() {
        let err = SessionError::Rejected {
            status: 403,
            reason: "forbidden".to_string(),
        };
        assert!(err.to_string().contains("403"));
    }

    #[test]
    fn credential_error_maps_to_storage_unavailable() {
        let err: SessionError = CredentialError::StorageUnavailable {
            reason: "disk".to_string(),
        }
        .into();
        assert_eq!(
            err,
            SessionError::StorageUnavailable {
                reason: "disk".to_string()
            }
        );
    }

    #[test]
    fn user_message_prefers_backend_detail() {
        let err = SessionError::AuthenticationFailed {
            reason: "Email o contraseña incorrectos".to_string(),
        };
        assert_eq!(err.user_message(), "Email o contraseña incorrectos");

        let bare = SessionError::AuthenticationFailed {
            reason: String::new(),
        };
        assert_eq!(bare.user_message(), "Credenciales incorrectas");
    }
}
