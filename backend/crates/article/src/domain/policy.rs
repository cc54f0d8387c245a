//! Content Policy
//!
//! Banned-pattern screen applied to machine-generated text before it is
//! written to an article. Matching is case-insensitive on whitespace-collapsed
//! text.

use thiserror::Error;

use crate::domain::value_object::ContentBlock;

const DEFAULT_BANNED_PATTERNS: &[&str] = &[
    "<script",
    "</script",
    "javascript:",
    "vbscript:",
    "data:text/html",
    "onerror=",
    "onload=",
    "<iframe",
    "ignore previous instructions",
    "ignore all previous instructions",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Text matches banned pattern '{pattern}'")]
pub struct PolicyViolation {
    pub pattern: String,
}

#[derive(Debug, Clone)]
pub struct ContentPolicy {
    banned: Vec<String>,
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BANNED_PATTERNS.iter().copied())
    }
}

impl ContentPolicy {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            banned: patterns
                .into_iter()
                .map(|p| canonical(p.as_ref()))
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn screen_text(&self, text: &str) -> Result<(), PolicyViolation> {
        let text = canonical(text);
        match self.banned.iter().find(|pattern| text.contains(pattern.as_str())) {
            Some(pattern) => Err(PolicyViolation {
                pattern: pattern.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Screen every reader-visible text field of every block.
    pub fn screen_blocks(&self, blocks: &[ContentBlock]) -> Result<(), PolicyViolation> {
        blocks
            .iter()
            .flat_map(|block| block.body.texts())
            .try_for_each(|text| self.screen_text(text))
    }
}

fn canonical(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
