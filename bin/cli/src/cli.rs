//! Command-line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "taller")]
#[command(version)]
#[command(about = "Terminal client for the taller workshop backend")]
pub struct Cli {
    /// Backend base URL (overrides TALLER__SESSION__API_BASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Token file (overrides TALLER__CREDENTIAL_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    pub credential_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and keep the token for later commands
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Show the signed-in user
    Whoami,

    /// Forget the stored token
    Logout,

    /// Check whether the signed-in user may open an app route
    Check {
        /// App path, e.g. /dashboard or /mis-vehiculos/3
        path: String,
    },

    /// Send an authorized GET to the backend and print the JSON answer
    Get {
        /// Backend path, e.g. /vehiculos
        path: String,
    },

    /// Create a customer account
    Register {
        /// Full name; the first word is the given name
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        #[arg(long)]
        phone: Option<String>,
    },

    /// Change the signed-in user's password
    ChangePassword {
        #[arg(long)]
        current: String,

        #[arg(long)]
        new: String,
    },

    /// Update the signed-in user's profile; omitted fields stay as they are
    UpdateProfile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        surname: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        address: Option<String>,
    },

    /// Email a password reset link
    ForgotPassword {
        #[arg(short, long)]
        email: String,
    },

    /// Set a new password with the token from a reset email
    ResetPassword {
        #[arg(long)]
        token: String,

        #[arg(long)]
        new: String,
    },

    /// Confirm an account email with the token from the confirmation mail
    ConfirmEmail {
        token: String,
    },

    /// Send the account confirmation email again
    ResendConfirmation {
        #[arg(short, long)]
        email: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_login_with_global_flags() {
        let cli = Cli::try_parse_from([
            "taller",
            "login",
            "--email",
            "ana@example.com",
            "--api-url",
            "http://api.test",
        ])
        .expect("parse");

        assert_eq!(cli.api_url.as_deref(), Some("http://api.test"));
        match cli.command {
            Command::Login { email, password } => {
                assert_eq!(email, "ana@example.com");
                assert_eq!(password, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn update_profile_fields_are_optional() {
        let cli = Cli::try_parse_from(["taller", "update-profile", "--phone", "600111222"])
            .expect("parse");

        match cli.command {
            Command::UpdateProfile {
                name,
                surname,
                phone,
                address,
            } => {
                assert_eq!(phone.as_deref(), Some("600111222"));
                assert!(name.is_none() && surname.is_none() && address.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn check_requires_a_path() {
        assert!(Cli::try_parse_from(["taller", "check"]).is_err());
    }
}
