//! Access model for the taller workshop frontend.
//!
//! This crate provides:
//! - The workshop roles (`Role`, `RoleSet`) with canonicalization at the
//!   boundary
//! - The authenticated principal (`Identity`)
//! - The session snapshot the UI renders from (`SessionSnapshot`)
//! - The route table and redirect targets (`AppRoute`, `Redirect`)
//! - Route protection decisions (`AccessGuard`, `GuardDecision`)
//!
//! Everything here is plain data and pure decisions. Network calls, token
//! storage and navigation live in the session crate and the front ends.
//!
//! # Example
//!
//! ```
//! use taller_core::UserId;
//! use taller_platform_access::{
//!     AccessGuard, AppRoute, GuardDecision, Identity, Role, SessionSnapshot,
//! };
//!
//! let identity = Identity::new(UserId::new(1), "ana@example.com", Role::parse("cliente"));
//! let session = SessionSnapshot::signed_in(identity);
//!
//! let guard = AccessGuard::for_route(AppRoute::AdminDashboard);
//! assert_eq!(guard.decide(&session), GuardDecision::Forbidden);
//!
//! let landing = session.role().map(|role| role.landing_route());
//! assert_eq!(landing, Some(AppRoute::MyAppointments));
//! ```

pub mod error;
pub mod guard;
pub mod role;
pub mod route;
pub mod session;
pub mod user;

// Re-export main types at crate root
pub use error::AuthorizationError;
pub use guard::{AccessGuard, GuardDecision};
pub use role::{Role, RoleSet};
pub use route::{AppRoute, RETURN_TO_PARAM, Redirect, return_to_from_query};
pub use session::SessionSnapshot;
pub use user::Identity;
