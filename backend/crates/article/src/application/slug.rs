//! Slug generation for articles whose author supplied none.
//!
//! The content-generation client may propose a slug; anything it returns is
//! re-canonicalized, and any failure falls back to the deterministic form of
//! the title.

use std::time::Duration;

use platform::crypto::random_suffix;

use crate::domain::ai::{AiClient, AiError};
use crate::domain::value_object::Slug;

const SUFFIX_LENGTH: usize = 6;

fn slug_prompt(title: &str) -> String {
    format!(
        "Suggest a short, URL-friendly slug for an article titled \"{}\". \
         Answer with the slug only: lowercase ASCII letters, digits and hyphens.",
        title.replace('"', "'")
    )
}

/// Deterministic slug for a title; titles with no usable characters get a
/// random one.
pub(crate) fn slug_from_title(title: &str) -> Slug {
    Slug::slugify(title)
        .unwrap_or_else(|| Slug::from_db(format!("article-{}", random_suffix(SUFFIX_LENGTH))))
}

pub(crate) async fn suggest_slug<I>(ai: &I, budget: Duration, title: &str) -> Slug
where
    I: AiClient,
{
    match tokio::time::timeout(budget, ai.complete(&slug_prompt(title))).await {
        Ok(Ok(answer)) => {
            let first_line = answer.lines().map(str::trim).find(|l| !l.is_empty());
            if let Some(slug) = first_line.and_then(Slug::slugify) {
                return slug;
            }
            tracing::debug!("Unusable slug suggestion, using title");
        }
        Ok(Err(AiError::Disabled)) => {}
        Ok(Err(e)) => tracing::debug!(error = %e, "Slug suggestion failed"),
        Err(_) => tracing::debug!("Slug suggestion timed out"),
    }
    slug_from_title(title)
}

/// `base` first, then `base-<random>` for the remaining attempts.
pub(crate) fn slug_candidates(base: &Slug, attempts: usize) -> Vec<Slug> {
    std::iter::once(base.clone())
        .chain(
            (1..attempts.max(1))
                .filter_map(|_| base.with_suffix(&random_suffix(SUFFIX_LENGTH)).ok()),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ai::DisabledAiClient;

    struct FixedAi(&'static str);

    impl AiClient for FixedAi {
        async fn complete(&self, _prompt: &str) -> Result<String, AiError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_suggestion_is_canonicalized() {
        let slug = suggest_slug(
            &FixedAi("\n  Rust Ownership Explained!\nextra"),
            Duration::from_secs(1),
            "x",
        )
        .await;
        assert_eq!(slug.as_str(), "rust-ownership-explained");
    }

    #[tokio::test]
    async fn test_falls_back_to_title() {
        let slug = suggest_slug(&DisabledAiClient, Duration::from_secs(1), "Hello World").await;
        assert_eq!(slug.as_str(), "hello-world");

        let slug = suggest_slug(&FixedAi("!!!"), Duration::from_secs(1), "Hello World").await;
        assert_eq!(slug.as_str(), "hello-world");
    }

    #[test]
    fn test_untitled_gets_random_slug() {
        let slug = slug_from_title("日本語");
        assert!(slug.as_str().starts_with("article-"));
        assert!(Slug::new(slug.as_str()).is_ok());
    }

    #[test]
    fn test_candidates() {
        let base = Slug::new("hello").unwrap();
        let candidates = slug_candidates(&base, 3);
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0], base);
        assert!(candidates[1].as_str().starts_with("hello-"));
        assert_ne!(candidates[1], candidates[2]);
    }
}
