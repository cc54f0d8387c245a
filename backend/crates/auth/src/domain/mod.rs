//! Domain Layer
//!
//! Contains entities, value objects, repository traits and the mailer port.

pub mod entity;
pub mod mailer;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{EmailToken, EmailTokenKind, EmailTokenPurpose, RefreshToken, User};
pub use mailer::{MailError, Mailer, OutgoingMail};
pub use repository::{EmailTokenRepository, IdentityStore, RefreshTokenRepository, UserRepository};
