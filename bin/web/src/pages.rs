//! Page components for the application.
//!
//! Each page is a Leptos component that renders a specific route.

pub mod confirm_email;
pub mod home;
pub mod login;
pub mod password_reset;
pub mod profile;
pub mod register;
pub mod section;
pub mod unauthorized;

// Re-export all page components for convenient access
pub use confirm_email::ConfirmEmailPage;
pub use home::HomePage;
pub use login::LoginPage;
pub use password_reset::PasswordResetPage;
pub use profile::ProfilePage;
pub use register::RegisterPage;
pub use section::SectionPage;
pub use unauthorized::UnauthorizedPage;
