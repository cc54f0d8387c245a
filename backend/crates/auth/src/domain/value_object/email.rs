//! Email Value Object
//!
//! Syntactic check only; ownership is proven by the mailed verification
//! code. Addresses are stored trimmed and lower-cased so the unique index
//! treats `Ann@Example.com` and `ann@example.com` as one account.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// RFC 5321 path limit
pub const EMAIL_MAX_LENGTH: usize = 254;
const LOCAL_PART_MAX_LENGTH: usize = 64;
const DOMAIN_LABEL_MAX_LENGTH: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("Email cannot be empty")]
    Empty,

    #[error("Email must be at most {EMAIL_MAX_LENGTH} characters")]
    TooLong,

    #[error("Invalid email format")]
    InvalidFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn new(input: impl AsRef<str>) -> Result<Self, EmailError> {
        let email = input.as_ref().trim().to_lowercase();
        if email.is_empty() {
            return Err(EmailError::Empty);
        }
        if email.chars().count() > EMAIL_MAX_LENGTH {
            return Err(EmailError::TooLong);
        }

        let (local, domain) = email.split_once('@').ok_or(EmailError::InvalidFormat)?;
        if !valid_local_part(local) || !valid_domain(domain) {
            return Err(EmailError::InvalidFormat);
        }
        Ok(Self(email))
    }

    /// Create from database value (assumed already normalized)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn valid_local_part(local: &str) -> bool {
    !local.is_empty()
        && local.len() <= LOCAL_PART_MAX_LENGTH
        && !local.chars().any(|c| c.is_whitespace() || c.is_control() || c == '@')
}

/// At least two dot-separated labels of ASCII alphanumerics and inner hyphens.
fn valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && label.len() <= DOMAIN_LABEL_MAX_LENGTH
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_and_lowercases() {
        let email = Email::new("  Ann.Lee+news@Mail.Example.COM ").unwrap();
        assert_eq!(email.as_str(), "ann.lee+news@mail.example.com");
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(Email::new("   "), Err(EmailError::Empty));
        for bad in [
            "no-at-sign.example.com",
            "@example.com",
            "ann@",
            "ann@@example.com",
            "ann@example",
            "ann@.example.com",
            "ann@example..com",
            "ann@-example.com",
            "ann@exa_mple.com",
            "a nn@example.com",
        ] {
            assert_eq!(Email::new(bad), Err(EmailError::InvalidFormat), "{bad}");
        }
    }

    #[test]
    fn test_length_limits() {
        let local = "a".repeat(LOCAL_PART_MAX_LENGTH + 1);
        assert!(Email::new(format!("{local}@example.com")).is_err());

        let long = format!("{}@example.com", "a".repeat(EMAIL_MAX_LENGTH));
        assert_eq!(Email::new(long), Err(EmailError::TooLong));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Email = serde_json::from_str("\"Bob@Example.com\"").unwrap();
        assert_eq!(ok.to_string(), "bob@example.com");
        assert!(serde_json::from_str::<Email>("\"bob\"").is_err());
    }
}
