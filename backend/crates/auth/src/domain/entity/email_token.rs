//! Email Token Entity
//!
//! Single-use opaque tokens delivered by mail: address verification, password
//! reset and pending email change.

use chrono::{DateTime, Duration, Utc};
use kernel::id::{EmailTokenId, UserId};
use platform::crypto::{random_token, sha256_hex};

use crate::domain::value_object::email::Email;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailTokenPurpose {
    Verify,
    PasswordReset,
    /// Carries the address that becomes the user's email once confirmed
    EmailChange { new_email: Email },
}

impl EmailTokenPurpose {
    pub fn id(&self) -> i16 {
        match self {
            EmailTokenPurpose::Verify => 0,
            EmailTokenPurpose::PasswordReset => 1,
            EmailTokenPurpose::EmailChange { .. } => 2,
        }
    }

    pub fn new_email(&self) -> Option<&Email> {
        match self {
            EmailTokenPurpose::EmailChange { new_email } => Some(new_email),
            _ => None,
        }
    }
}

/// Purpose discriminant without payload, used for lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTokenKind {
    Verify = 0,
    PasswordReset = 1,
    EmailChange = 2,
}

impl EmailTokenKind {
    pub fn id(self) -> i16 {
        self as i16
    }
}

impl From<&EmailTokenPurpose> for EmailTokenKind {
    fn from(purpose: &EmailTokenPurpose) -> Self {
        match purpose {
            EmailTokenPurpose::Verify => EmailTokenKind::Verify,
            EmailTokenPurpose::PasswordReset => EmailTokenKind::PasswordReset,
            EmailTokenPurpose::EmailChange { .. } => EmailTokenKind::EmailChange,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmailToken {
    pub id: EmailTokenId,
    pub user_id: UserId,
    pub token_hash: String,
    pub purpose: EmailTokenPurpose,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl EmailToken {
    /// Mint a token. Returns the entity and the plaintext to mail out.
    pub fn issue(user_id: UserId, purpose: EmailTokenPurpose, ttl: Duration) -> (Self, String) {
        let plaintext = random_token();
        let now = Utc::now();
        let token = Self {
            id: EmailTokenId::new(),
            user_id,
            token_hash: Self::digest(&plaintext),
            purpose,
            expires_at: now + ttl,
            created_at: now,
        };
        (token, plaintext)
    }

    pub fn digest(token: &str) -> String {
        sha256_hex(token.trim().as_bytes())
    }

    pub fn kind(&self) -> EmailTokenKind {
        EmailTokenKind::from(&self.purpose)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
