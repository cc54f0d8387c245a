//! Create Article Use Case
//!
//! Drafts a new article for the caller. Without a caller-supplied slug one is
//! generated and retried with a random suffix on collision.

use std::sync::Arc;

use kernel::CurrentUser;

use crate::application::config::ArticleConfig;
use crate::application::slug::{slug_candidates, suggest_slug};
use crate::application::tags::prepare_article_tags;
use crate::domain::ai::AiClient;
use crate::domain::entity::{
    Article, NewArticle, normalize_excerpt, normalize_language, normalize_title,
};
use crate::domain::repository::{ArticleRepository, TagRepository};
use crate::domain::value_object::{ContentBlock, Slug, validate_content};
use crate::error::{ArticleError, ArticleResult};

/// Create article input
#[derive(Debug, Clone)]
pub struct CreateArticleInput {
    pub title: String,
    pub slug: Option<String>,
    pub excerpt: String,
    pub language: String,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub content: Vec<ContentBlock>,
}

/// Create Article Use Case
pub struct CreateArticleUseCase<A, T, I>
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

impl<A, T, I> CreateArticleUseCase<A, T, I>
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
        input: CreateArticleInput,
    ) -> ArticleResult<Article> {
        let title = normalize_title(&input.title)?;
        let excerpt = normalize_excerpt(&input.excerpt)?;
        let language = normalize_language(&input.language)?;
        validate_content(&input.content)?;
        let tags = prepare_article_tags(
            self.tag_repo.as_ref(),
            &input.tags,
            self.config.max_tags_per_article,
        )
        .await?;

        let owned = self.article_repo.count_by_author(caller.user_id).await?;
        if owned >= self.config.max_articles_per_user {
            tracing::warn!(user_id = %caller.user_id, owned, "Article quota reached");
            return Err(ArticleError::MaxArticlesPerUser(self.config.max_articles_per_user));
        }

        let requested = input
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

        let generated = requested.is_none();
        let base = match requested {
            Some(slug) => slug,
            None => suggest_slug(self.ai.as_ref(), self.config.ai_timeout, &title).await,
        };

        let mut article = Article::draft(NewArticle {
            author_id: caller.user_id,
            slug: base.clone(),
            title,
            excerpt,
            language,
            cover_image: input
                .cover_image
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
            content: input.content,
            tags,
        });

        if generated {
            self.insert_with_generated_slug(&mut article, &base).await?;
        } else {
            self.article_repo.insert(&article).await?;
        }

        tracing::info!(
            article_id = %article.article_id,
            user_id = %caller.user_id,
            slug = %article.slug,
            status = article.status.code(),
            "Article created"
        );
        Ok(article)
    }

    async fn insert_with_generated_slug(
        &self,
        article: &mut Article,
        base: &Slug,
    ) -> ArticleResult<()> {
        let candidates = slug_candidates(base, self.config.slug_attempts);
        let last = candidates.len().saturating_sub(1);

        for (attempt, slug) in candidates.into_iter().enumerate() {
            article.slug = slug;
            match self.article_repo.insert(article).await {
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
