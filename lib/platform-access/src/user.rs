//! Identity of the authenticated principal.
//!
//! The workshop backend returns users with Spanish field names (`nombre`,
//! `rol`, `es_activo`, ...). The identity accepts both those and the English
//! names it serializes to, and canonicalizes the role while deserializing.

use serde::{Deserialize, Serialize};
use taller_core::UserId;

use crate::role::Role;

fn default_active() -> bool {
    true
}

fn non_blank(part: Option<&str>) -> Option<&str> {
    part.map(str::trim).filter(|p| !p.is_empty())
}

/// Represents the authenticated user as known to the client.
///
/// Created on successful login or session restore and replaced wholesale on
/// re-login. There are no setters: a changed profile arrives as a new
/// identity from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Backend user ID.
    id: UserId,
    /// Given name shown in the UI.
    #[serde(default, alias = "nombre")]
    name: Option<String>,
    /// Family name(s).
    #[serde(default, alias = "apellidos")]
    surname: Option<String>,
    /// Login email.
    email: String,
    /// Contact phone.
    #[serde(default, alias = "telefono")]
    phone: Option<String>,
    /// Postal address.
    #[serde(default, alias = "direccion")]
    address: Option<String>,
    /// Canonical role.
    #[serde(alias = "rol")]
    role: Role,
    /// Whether the account is enabled.
    #[serde(
        default = "default_active",
        alias = "es_activo",
        alias = "activo",
        alias = "is_active"
    )]
    active: bool,
}

impl Identity {
    /// Creates an active identity with the required fields.
    #[must_use]
    pub fn new(id: UserId, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: None,
            surname: None,
            email: email.into(),
            phone: None,
            address: None,
            role,
            active: true,
        }
    }

    /// Sets the given name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the family name.
    #[must_use]
    pub fn with_surname(mut self, surname: impl Into<String>) -> Self {
        self.surname = Some(surname.into());
        self
    }

    /// Sets the contact phone.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the postal address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the active flag.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Returns the backend user ID.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the given name, if the backend sent one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the family name, if the backend sent one.
    #[must_use]
    pub fn surname(&self) -> Option<&str> {
        self.surname.as_deref()
    }

    /// Returns the login email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the contact phone, if any.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Returns the canonical role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns whether the account is enabled.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Name to show in menus: "name surname", falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (non_blank(self.name()), non_blank(self.surname())) {
            (Some(name), Some(surname)) => format!("{name} {surname}"),
            (Some(name), None) => name.to_string(),
            (None, _) => self.email.clone(),
        }
    }
}
