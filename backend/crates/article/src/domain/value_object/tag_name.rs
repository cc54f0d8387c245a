//! Tag Name Value Object
//!
//! Normalization:
//! - NFKC, trimmed, lower-cased
//! - internal whitespace runs collapsed to a single space

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

pub const TAG_NAME_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagNameError {
    #[error("Tag name cannot be empty")]
    Empty,

    #[error("Tag name is too long ({length} chars, maximum {max})")]
    TooLong { length: usize, max: usize },

    #[error("Tag name contains a control character")]
    ControlCharacter,
}

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagName(String);

impl TagName {
    pub fn new(input: impl AsRef<str>) -> Result<Self, TagNameError> {
        let normalized = input
            .as_ref()
            .nfkc()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        if normalized.is_empty() {
            return Err(TagNameError::Empty);
        }
        let length = normalized.chars().count();
        if length > TAG_NAME_MAX_LENGTH {
            return Err(TagNameError::TooLong {
                length,
                max: TAG_NAME_MAX_LENGTH,
            });
        }
        if normalized.chars().any(char::is_control) {
            return Err(TagNameError::ControlCharacter);
        }
        Ok(Self(normalized))
    }

    /// Normalize, de-duplicate (first occurrence wins) and keep input order.
    pub fn normalize_all<I, S>(names: I) -> Result<Vec<Self>, TagNameError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<Self> = Vec::new();
        for name in names {
            let name = Self::new(name)?;
            if !out.contains(&name) {
                out.push(name);
            }
        }
        Ok(out)
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

impl TryFrom<String> for TagName {
    type Error = TagNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TagName> for String {
    fn from(name: TagName) -> Self {
        name.0
    }
}

impl fmt::Debug for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TagName").field(&self.0).finish()
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(TagName::new("  Rust ").unwrap().as_str(), "rust");
        assert_eq!(TagName::new("Machine \t  Learning").unwrap().as_str(), "machine learning");
        // Full-width letters fold under NFKC
        assert_eq!(TagName::new("ＧＯ").unwrap().as_str(), "go");
    }

    #[test]
    fn test_rejections() {
        assert_eq!(TagName::new("   "), Err(TagNameError::Empty));
        assert!(matches!(
            TagName::new("x".repeat(51)),
            Err(TagNameError::TooLong { length: 51, .. })
        ));
    }

    #[test]
    fn test_normalize_all_dedups_in_order() {
        let names = TagName::normalize_all(["Go", "rust", "GO ", "Rust"]).unwrap();
        let names: Vec<&str> = names.iter().map(TagName::as_str).collect();
        assert_eq!(names, vec!["go", "rust"]);
    }
}
