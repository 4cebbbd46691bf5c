//! Command dispatch over the session core.

use crate::cli::{Cli, Command};
use crate::config::CliConfig;
use crate::error::CliError;
use rootcause::prelude::Report;
use serde_json::Value;
use std::io::{BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use taller_platform_access::{AccessGuard, AppRoute};
use taller_session::{
    FileCredentialStore, NewAccount, ProfileUpdate, SessionClient, SessionError, SessionState,
};
use tracing::debug;

/// How a command ended when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command did what was asked.
    Done,
    /// The backend or the guard said no; the reason was printed.
    Refused,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Done => ExitCode::SUCCESS,
            Outcome::Refused => ExitCode::FAILURE,
        }
    }
}

/// Applies command-line overrides on top of the environment configuration.
#[must_use]
pub fn effective_config(cli: &Cli, mut config: CliConfig) -> CliConfig {
    if let Some(url) = &cli.api_url {
        config = config.with_api_base_url(url.clone());
    }
    if let Some(path) = &cli.credential_path {
        config = config.with_credential_path(path.clone());
    }
    config
}

/// Runs one command, writing human-readable results to `out`.
///
/// # Errors
///
/// Returns an error for failures the user cannot fix by retrying with other
/// input: transport problems, unreadable answers, unknown routes.
pub async fn run(
    command: Command,
    config: CliConfig,
    out: &mut impl Write,
) -> Result<Outcome, CliError> {
    debug!(credential_path = %config.credential_path.display(), "using token file");
    let store = Arc::new(FileCredentialStore::new(&config.credential_path));
    let state = SessionState::new(SessionClient::new(config.session, store)?);

    match command {
        Command::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            login(&state, &email, &password, out).await
        }
        Command::Whoami => whoami(&state, out).await,
        Command::Logout => {
            let redirect = state.logout();
            writeln!(out, "Signed out (next: {})", redirect.location())?;
            Ok(Outcome::Done)
        }
        Command::Check { path } => check(&state, &path, out).await,
        Command::Get { path } => get(&state, &path, out).await,
        Command::Register {
            name,
            email,
            password,
            phone,
        } => {
            let mut account = NewAccount::new(name, email, password);
            if let Some(phone) = phone {
                account = account.with_phone(phone);
            }
            register(&state, &account, out).await
        }
        Command::ChangePassword { current, new } => {
            state.bootstrap("").await;
            match state.client().change_password(&current, &new).await {
                Ok(()) => {
                    writeln!(out, "Password changed")?;
                    Ok(Outcome::Done)
                }
                Err(e) => refusal(e.current_context(), out),
            }
        }
        Command::UpdateProfile {
            name,
            surname,
            phone,
            address,
        } => {
            let update = profile_update(name, surname, phone, address);
            update_profile(&state, &update, out).await
        }
        Command::ForgotPassword { email } => {
            let result = state.client().request_password_reset(&email).await;
            acknowledge(result, "Reset link requested; check your email", out)
        }
        Command::ResetPassword { token, new } => {
            let result = state.client().reset_password(&token, &new).await;
            acknowledge(result, "Password reset; sign in with `taller login`", out)
        }
        Command::ConfirmEmail { token } => {
            let result = state.client().confirm_email(&token).await;
            acknowledge(result, "Email confirmed", out)
        }
        Command::ResendConfirmation { email } => {
            let result = state.client().resend_confirmation(&email).await;
            acknowledge(result, "Confirmation email sent", out)
        }
    }
}

fn profile_update(
    name: Option<String>,
    surname: Option<String>,
    phone: Option<String>,
    address: Option<String>,
) -> ProfileUpdate {
    let mut update = ProfileUpdate::new();
    if let Some(name) = name {
        update = update.with_name(name);
    }
    if let Some(surname) = surname {
        update = update.with_surname(surname);
    }
    if let Some(phone) = phone {
        update = update.with_phone(phone);
    }
    if let Some(address) = address {
        update = update.with_address(address);
    }
    update
}

/// Prints `done` on success, or the refusal.
fn acknowledge(
    result: Result<(), Report<SessionError>>,
    done: &str,
    out: &mut impl Write,
) -> Result<Outcome, CliError> {
    match result {
        Ok(()) => {
            writeln!(out, "{done}")?;
            Ok(Outcome::Done)
        }
        Err(e) => refusal(e.current_context(), out),
    }
}

fn read_password() -> Result<String, CliError> {
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Prints a refusal the user can act on, or passes anything else up.
fn refusal(error: &SessionError, out: &mut impl Write) -> Result<Outcome, CliError> {
    match error {
        SessionError::AuthenticationFailed { .. } => {
            writeln!(out, "{}", error.user_message())?;
        }
        SessionError::SessionExpired => {
            writeln!(out, "Session expired; run `taller login` again")?;
        }
        SessionError::Rejected { status, reason } => {
            writeln!(out, "Refused ({status}): {reason}")?;
        }
        other => return Err(CliError::Session(other.clone())),
    }
    Ok(Outcome::Refused)
}

async fn login(
    state: &SessionState,
    email: &str,
    password: &str,
    out: &mut impl Write,
) -> Result<Outcome, CliError> {
    match state.login(email, password).await {
        Ok(landing) => {
            if let Some(identity) = state.identity() {
                writeln!(
                    out,
                    "Signed in as {} ({})",
                    identity.display_name(),
                    identity.role()
                )?;
            }
            writeln!(out, "Landing page: {}", landing.location())?;
            Ok(Outcome::Done)
        }
        Err(e) => refusal(e.current_context(), out),
    }
}

async fn whoami(state: &SessionState, out: &mut impl Write) -> Result<Outcome, CliError> {
    state.bootstrap("").await;
    match state.identity() {
        Some(identity) => {
            writeln!(out, "{} <{}>", identity.display_name(), identity.email())?;
            writeln!(out, "id:   {}", identity.id())?;
            writeln!(out, "role: {}", identity.role())?;
            Ok(Outcome::Done)
        }
        None => {
            writeln!(out, "Not signed in")?;
            Ok(Outcome::Refused)
        }
    }
}

async fn check(state: &SessionState, path: &str, out: &mut impl Write) -> Result<Outcome, CliError> {
    let route = AppRoute::from_path(path).ok_or_else(|| CliError::UnknownRoute {
        path: path.to_string(),
    })?;
    if route.is_public() {
        writeln!(out, "public: {route}")?;
        return Ok(Outcome::Done);
    }
    state.bootstrap(path).await;

    let snapshot = state.snapshot();
    let guard = AccessGuard::for_route(route);
    match guard.check(&snapshot) {
        Ok(()) => {
            writeln!(out, "allowed: {route}")?;
            Ok(Outcome::Done)
        }
        Err(e) => {
            writeln!(out, "denied: {e}")?;
            if let Some(redirect) = guard.redirect(&snapshot, path) {
                writeln!(out, "redirect: {}", redirect.location())?;
            }
            Ok(Outcome::Refused)
        }
    }
}

async fn get(state: &SessionState, path: &str, out: &mut impl Write) -> Result<Outcome, CliError> {
    state.bootstrap("").await;
    match state.client().get(path).send_json::<Value>().await {
        Ok(body) => {
            let pretty = serde_json::to_string_pretty(&body).map_err(|e| CliError::Io {
                reason: e.to_string(),
            })?;
            writeln!(out, "{pretty}")?;
            Ok(Outcome::Done)
        }
        Err(e) => refusal(e.current_context(), out),
    }
}

async fn update_profile(
    state: &SessionState,
    update: &ProfileUpdate,
    out: &mut impl Write,
) -> Result<Outcome, CliError> {
    if update.is_empty() {
        writeln!(out, "Nothing to update")?;
        return Ok(Outcome::Refused);
    }
    state.bootstrap("").await;
    match state.update_profile(update).await {
        Ok(identity) => {
            writeln!(out, "Profile updated: {}", identity.display_name())?;
            Ok(Outcome::Done)
        }
        Err(e) => refusal(e.current_context(), out),
    }
}

async fn register(
    state: &SessionState,
    account: &NewAccount,
    out: &mut impl Write,
) -> Result<Outcome, CliError> {
    match state.client().register(account).await {
        Ok(identity) => {
            writeln!(
                out,
                "Account created for {}; sign in with `taller login`",
                identity.email()
            )?;
            Ok(Outcome::Done)
        }
        Err(e) => refusal(e.current_context(), out),
    }
}
