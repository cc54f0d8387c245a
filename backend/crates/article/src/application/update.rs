//! Update Article Use Case
//!
//! Only title, slug, excerpt, language, tags and content are editable. A
//! request that tries to move the status sends the article back to draft.
//! The write is guarded by the version read at load time.

use std::sync::Arc;

use chrono::Utc;
use kernel::CurrentUser;
use kernel::id::ArticleId;

use crate::application::access::load_for_caller;
use crate::application::config::ArticleConfig;
use crate::application::slug::{slug_candidates, suggest_slug};
use crate::application::tags::prepare_article_tags;
use crate::domain::ai::AiClient;
use crate::domain::entity::{
    Article, ArticleStatus, normalize_excerpt, normalize_language, normalize_title,
};
use crate::domain::repository::{ArticleRepository, TagRepository};
use crate::domain::value_object::{ContentBlock, Slug, validate_content};
use crate::error::{ArticleError, ArticleResult};

/// Partial update; `None` leaves the field alone.
#[derive(Debug, Clone, Default)]
pub struct UpdateArticleInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub language: Option<String>,
    pub tags: Option<Vec<String>>,
    pub content: Option<Vec<ContentBlock>>,
    /// Not writable; any attempt to change it resets the article to draft
    pub status: Option<ArticleStatus>,
}

/// Update Article Use Case
pub struct UpdateArticleUseCase<A, T, I>
where
    A: ArticleRepository,
    T: TagRepository,
    I: AiClient,
{
    article_repo: Arc<A>,
    tag_repo: Arc<T>,
    ai: Arc<I>,
    config: Arc<ArticleConfig>,
}

impl<A, T, I> UpdateArticleUseCase<A, T, I>
where
    A: ArticleRepository,
    T: TagRepository,
    I: AiClient,
{
    pub fn new(
        article_repo: Arc<A>,
        tag_repo: Arc<T>,
        ai: Arc<I>,
        config: Arc<ArticleConfig>,
    ) -> Self {
        Self {
            article_repo,
            tag_repo,
            ai,
            config,
        }
    }

    pub async fn execute(
        &self,
        caller: &CurrentUser,
        article_id: ArticleId,
        input: UpdateArticleInput,
    ) -> ArticleResult<Article> {
        let original = load_for_caller(self.article_repo.as_ref(), caller, article_id).await?;
        if original.status == ArticleStatus::Deleted {
            return Err(ArticleError::AlreadyDeleted);
        }
        let mut article = original.clone();

        if let Some(title) = &input.title {
            article.title = normalize_title(title)?;
        }
        if let Some(excerpt) = &input.excerpt {
            article.excerpt = normalize_excerpt(excerpt)?;
        }
        if let Some(language) = &input.language {
            article.language = normalize_language(language)?;
        }
        if let Some(content) = input.content {
            validate_content(&content)?;
            article.content = content;
        }
        if let Some(tags) = &input.tags {
            article.tags =
                prepare_article_tags(
                    self.tag_repo.as_ref(),
                    tags,
                    self.config.max_tags_per_article,
                )
                .await?;
        }
        if input.status.is_some_and(|status| status != original.status) {
            article.status = ArticleStatus::Draft;
            article.archived_at = None;
        }

        let requested_slug = input
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Slug::slugify(s).ok_or_else(|| {
                    ArticleError::InvalidInput("slug has no usable characters".into())
                })
            })
            .transpose()?;

        // Published URLs stay stable; only never-published drafts follow their title.
        let regenerate = requested_slug.is_none()
            && article.title != original.title
            && !original.ever_published();
        match requested_slug {
            Some(slug) => article.slug = slug,
            None if regenerate => {
                article.slug =
                    suggest_slug(self.ai.as_ref(), self.config.ai_timeout, &article.title).await;
            }
            None => {}
        }

        if article == original {
            return Err(ArticleError::NoChangesDetected);
        }
        article.updated_at = Utc::now();

        if regenerate && article.slug != original.slug {
            self.write_with_generated_slug(&mut article, original.version).await?;
        } else {
            self.article_repo.update(&article, original.version).await?;
        }
        article.version = original.version + 1;

        tracing::info!(
            article_id = %article.article_id,
            user_id = %caller.user_id,
            status = article.status.code(),
            "Article updated"
        );
        Ok(article)
    }

    async fn write_with_generated_slug(
        &self,
        article: &mut Article,
        expected_version: i64,
    ) -> ArticleResult<()> {
        let base = article.slug.clone();
        let candidates = slug_candidates(&base, self.config.slug_attempts);
        let last = candidates.len().saturating_sub(1);

        for (attempt, slug) in candidates.into_iter().enumerate() {
            article.slug = slug;
            match self.article_repo.update(article, expected_version).await {
                Err(ArticleError::DuplicateArticleSlug) if attempt < last => {
                    tracing::debug!(
                        slug = %article.slug,
                        attempt,
                        "Generated slug taken, retrying"
                    );
                }
                result => return result,
            }
        }
        Err(ArticleError::DuplicateArticleSlug)
    }
}
