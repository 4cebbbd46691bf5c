//! Session wiring for the Leptos app.
//!
//! The session core publishes snapshots through a watch channel; this module
//! mirrors them into a signal so views re-render, and turns guard decisions
//! into router navigations.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::Redirect as Navigate;
use leptos_router::hooks::{use_location, use_navigate};
use taller_core::Result;
use taller_platform_access::{AccessGuard, AppRoute, GuardDecision, SessionSnapshot};
use taller_session::{SessionClient, SessionConfig, SessionError, SessionState};

use crate::storage::credential_store;

/// Session handle provided to every component through context.
#[derive(Clone)]
pub struct AuthContext {
    state: SessionState,
    snapshot: RwSignal<SessionSnapshot>,
}

impl AuthContext {
    /// Builds the session for this page load and starts mirroring it.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let store = credential_store(config.token_key());
        let state = SessionState::new(SessionClient::new(config, store)?);

        let mut changes = state.subscribe();
        let snapshot = RwSignal::new(changes.borrow_and_update().clone());
        spawn_local(async move {
            while changes.changed().await.is_ok() {
                snapshot.set(changes.borrow_and_update().clone());
            }
        });

        Ok(Self { state, snapshot })
    }

    /// Returns the session state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns the reactive snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ReadSignal<SessionSnapshot> {
        self.snapshot.read_only()
    }
}

/// Backend configuration baked in at build time.
///
/// `TALLER_API_BASE_URL` overrides the default backend URL when set during
/// the build.
#[must_use]
pub fn session_config() -> SessionConfig {
    match option_env!("TALLER_API_BASE_URL") {
        Some(url) => SessionConfig::new(url),
        None => SessionConfig::default(),
    }
}

/// Joins the router's path and query string back into a location.
#[must_use]
pub fn requested_location(pathname: &str, search: &str) -> String {
    let search = search.trim_start_matches('?');
    if search.is_empty() {
        pathname.to_string()
    } else {
        format!("{pathname}?{search}")
    }
}

/// Runs the startup restore once and performs the landing redirect.
#[component]
pub fn SessionBootstrap() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let navigate = use_navigate();
    let pathname = use_location().pathname.get_untracked();

    spawn_local(async move {
        if let Some(redirect) = auth.state().bootstrap(&pathname).await {
            navigate(&redirect.location(), Default::default());
        }
    });
}

/// What a protected view shows for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectedView {
    /// Session still loading.
    Placeholder,
    /// The protected children.
    Content,
    /// Navigate to this location instead.
    Navigate(String),
}

/// Maps a guard decision to what the view shows.
///
/// `requested` is the location the user tried to enter.
#[must_use]
pub fn protected_view(
    guard: &AccessGuard,
    snapshot: &SessionSnapshot,
    requested: &str,
) -> ProtectedView {
    match guard.decide(snapshot) {
        GuardDecision::Checking => ProtectedView::Placeholder,
        GuardDecision::Allowed => ProtectedView::Content,
        GuardDecision::Denied | GuardDecision::Forbidden => guard
            .redirect(snapshot, requested)
            .map_or(ProtectedView::Placeholder, |redirect| {
                ProtectedView::Navigate(redirect.location())
            }),
    }
}

/// Renders `children` only when the session may see `route`.
///
/// While the session is loading a neutral placeholder is shown. Denied and
/// forbidden sessions are redirected.
#[component]
pub fn Protected(route: AppRoute, children: ChildrenFn) -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let location = use_location();
    let guard = AccessGuard::for_route(route);

    move || {
        let snapshot = auth.snapshot().get();
        let requested = requested_location(
            &location.pathname.get_untracked(),
            &location.search.get_untracked(),
        );
        match protected_view(&guard, &snapshot, &requested) {
            ProtectedView::Content => children().into_any(),
            ProtectedView::Placeholder => view! {
                <div class="guard-checking">
                    <span class="spinner"></span>
                </div>
            }
            .into_any(),
            ProtectedView::Navigate(path) => view! { <Navigate path=path/> }.into_any(),
        }
    }
}
