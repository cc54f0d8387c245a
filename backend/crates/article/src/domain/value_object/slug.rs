//! Slug Value Object
//!
//! URL-safe article identifier: `[a-z0-9]+(-[a-z0-9]+)*`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

pub const SLUG_MAX_LENGTH: usize = 120;

/// Generated slugs are cut at a word boundary below this length so a
/// collision suffix still fits.
const GENERATED_SLUG_BUDGET: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlugError {
    #[error("Slug cannot be empty")]
    Empty,

    #[error("Slug must be at most {SLUG_MAX_LENGTH} characters")]
    TooLong,

    #[error("Slug may only contain lowercase letters, digits and single hyphens")]
    InvalidFormat,
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Strict constructor: the input must already be in canonical form.
    pub fn new(value: impl Into<String>) -> Result<Self, SlugError> {
        let value = value.into();
        if value.is_empty() {
            return Err(SlugError::Empty);
        }
        if value.len() > SLUG_MAX_LENGTH {
            return Err(SlugError::TooLong);
        }
        let well_formed = value
            .split('-')
            .all(|part| {
                !part.is_empty()
                    && part.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
            });
        if !well_formed {
            return Err(SlugError::InvalidFormat);
        }
        Ok(Self(value))
    }

    /// Canonicalize free text into a slug. `None` when nothing usable remains
    /// (e.g. a title written entirely in a non-Latin script).
    pub fn slugify(text: &str) -> Option<Self> {
        let mut out = String::with_capacity(text.len());
        let mut pending_dash = false;

        for c in text.nfkd().filter(|c| !is_combining_mark(*c)) {
            if c.is_ascii_alphanumeric() {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push(c.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }

        if out.len() > GENERATED_SLUG_BUDGET {
            out.truncate(GENERATED_SLUG_BUDGET);
            if let Some(cut) = out.rfind('-') {
                out.truncate(cut);
            }
        }
        Self::new(out).ok()
    }

    /// Same slug with a `-suffix` appended, used to retry generated slugs.
    pub fn with_suffix(&self, suffix: &str) -> Result<Self, SlugError> {
        Self::new(format!("{}-{}", self.0, suffix))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl fmt::Debug for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Slug").field(&self.0).finish()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        let slug = |s: &str| Slug::slugify(s).map(|s| s.as_str().to_string());
        assert_eq!(slug("Hello, World!").as_deref(), Some("hello-world"));
        assert_eq!(slug("  --Rust  2024--  ").as_deref(), Some("rust-2024"));
        assert_eq!(slug("Café crème").as_deref(), Some("cafe-creme"));
        assert_eq!(slug("日本語"), None);
        assert_eq!(slug("!!!"), None);
    }

    #[test]
    fn test_slugify_truncates_at_word_boundary() {
        let title = "word ".repeat(40);
        let slug = Slug::slugify(&title).unwrap();
        assert!(slug.as_str().len() <= GENERATED_SLUG_BUDGET);
        assert!(!slug.as_str().ends_with('-'));
    }

    #[test]
    fn test_strict_format() {
        assert!(Slug::new("hello-world-2").is_ok());
        assert_eq!(Slug::new(""), Err(SlugError::Empty));
        assert_eq!(Slug::new("Hello"), Err(SlugError::InvalidFormat));
        assert_eq!(Slug::new("a--b"), Err(SlugError::InvalidFormat));
        assert_eq!(Slug::new("-a"), Err(SlugError::InvalidFormat));
        assert_eq!(Slug::new("a-"), Err(SlugError::InvalidFormat));
        assert_eq!(Slug::new("a".repeat(121)), Err(SlugError::TooLong));
    }

    #[test]
    fn test_with_suffix() {
        let slug = Slug::new("hello").unwrap();
        assert_eq!(slug.with_suffix("x1y2").unwrap().as_str(), "hello-x1y2");
    }
}
