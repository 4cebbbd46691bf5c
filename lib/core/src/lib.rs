//! Core types and utilities shared across the taller workspace.
//!
//! This crate provides the `Result` alias used by every fallible
//! operation in the workspace and the identifier types handed out by the
//! workshop backend.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ParseIdError, UserId};
