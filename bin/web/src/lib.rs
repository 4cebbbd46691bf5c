//! taller workshop browser front end.
//!
//! A client-side Leptos app over the session core: it owns the navigation
//! effects (redirects, the login form, route protection) and delegates every
//! session decision to `taller-session` and `taller-platform-access`.

#![allow(non_snake_case)]

pub mod app;
pub mod auth;
pub mod pages;
pub mod storage;
