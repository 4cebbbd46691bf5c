//! Errors surfaced by the CLI.

use rootcause::prelude::Report;
use std::fmt;
use taller_session::SessionError;

/// Errors that end a CLI invocation.
///
/// Refusals the user can act on (bad credentials, a forbidden route) are
/// reported as an unsuccessful outcome instead.
#[derive(Debug)]
pub enum CliError {
    /// Environment configuration could not be loaded.
    Config { reason: String },
    /// A session operation failed.
    Session(SessionError),
    /// The path does not name a view of the app.
    UnknownRoute { path: String },
    /// Reading input or writing output failed.
    Io { reason: String },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { reason } => write!(f, "invalid configuration: {reason}"),
            Self::Session(e) => write!(f, "{e}"),
            Self::UnknownRoute { path } => write!(f, "no view is mounted at {path}"),
            Self::Io { reason } => write!(f, "i/o error: {reason}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<config::ConfigError> for CliError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config {
            reason: e.to_string(),
        }
    }
}

impl From<Report<SessionError>> for CliError {
    fn from(report: Report<SessionError>) -> Self {
        Self::Session(report.current_context().clone())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            reason: e.to_string(),
        }
    }
}
