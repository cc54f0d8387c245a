//! Entities

pub mod email_token;
pub mod refresh_token;
pub mod user;

pub use email_token::{EmailToken, EmailTokenKind, EmailTokenPurpose};
pub use refresh_token::RefreshToken;
pub use user::User;
