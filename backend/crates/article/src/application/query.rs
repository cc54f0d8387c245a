//! Article Query Use Case
//!
//! Single-article reads and the paginated listings. Anything that is not
//! published is only visible to its author and to admins.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{ArticleId, UserId};
use kernel::{CurrentUser, Page, PageRequest};

use crate::application::access::require_admin;
use crate::application::config::ArticleConfig;
use crate::application::engagement::record_view;
use crate::application::tags::TagUseCase;
use crate::domain::entity::{Article, ArticleStatus, normalize_language};
use crate::domain::repository::{
    ArticleFilter, ArticleListing, ArticleRepository, ArticleSort, EngagementRepository,
    TagRepository,
};
use crate::domain::value_object::{Slug, TagName};
use crate::error::{ArticleError, ArticleResult};

/// Raw filter criteria; tags and language are normalized before querying.
#[derive(Debug, Clone, Default)]
pub struct ArticleFilterInput {
    pub author_id: Option<UserId>,
    pub tags: Vec<String>,
    pub language: Option<String>,
    pub published_after: Option<DateTime<Utc>>,
    pub published_before: Option<DateTime<Utc>>,
    pub sort: ArticleSort,
}

/// Article Query Use Case
pub struct ArticleQueryUseCase<A, T, E>
where
    A: ArticleRepository,
    T: TagRepository,
    E: EngagementRepository,
{
    article_repo: Arc<A>,
    tags: TagUseCase<T>,
    engagement_repo: Arc<E>,
    config: Arc<ArticleConfig>,
}

impl<A, T, E> ArticleQueryUseCase<A, T, E>
where
    A: ArticleRepository,
    T: TagRepository,
    E: EngagementRepository,
{
    pub fn new(
        article_repo: Arc<A>,
        tag_repo: Arc<T>,
        engagement_repo: Arc<E>,
        config: Arc<ArticleConfig>,
    ) -> Self {
        Self {
            article_repo,
            tags: TagUseCase::new(tag_repo),
            engagement_repo,
            config,
        }
    }

    pub async fn get_by_id(
        &self,
        caller: Option<&CurrentUser>,
        article_id: ArticleId,
    ) -> ArticleResult<Article> {
        let Some(article) = self.article_repo.find_by_id(article_id).await? else {
            tracing::debug!(article_id = %article_id, reason = "missing", "Article not found");
            return Err(ArticleError::NotFound);
        };
        if !article.is_visible_to(caller) {
            tracing::debug!(article_id = %article_id, reason = "not_visible", "Article not found");
            return Err(ArticleError::NotFound);
        }
        Ok(article)
    }

    /// Public read by slug. Only published articles resolve, for every
    /// caller, and the read counts as a view.
    pub async fn get_by_slug(
        &self,
        slug: &str,
        viewer_id: Option<UserId>,
        ip: Option<String>,
    ) -> ArticleResult<Article> {
        let slug = Slug::new(slug).map_err(|_| ArticleError::NotFound)?;
        let mut article = self
            .article_repo
            .find_by_slug(&slug)
            .await?
            .filter(Article::is_published)
            .ok_or(ArticleError::NotFound)?;

        let counted = record_view(
            self.engagement_repo.as_ref(),
            &self.config,
            &article,
            viewer_id,
            ip,
        )
        .await?;
        if counted {
            article.stats.view_count += 1;
        }
        Ok(article)
    }

    /// The caller's own articles in every status but deleted.
    pub async fn list_mine(
        &self,
        caller: &CurrentUser,
        page: PageRequest,
    ) -> ArticleResult<Page<Article>> {
        self.list(ArticleListing::ByAuthor { author_id: caller.user_id }, page).await
    }

    /// The caller's deleted articles.
    pub async fn trash(
        &self,
        caller: &CurrentUser,
        page: PageRequest,
    ) -> ArticleResult<Page<Article>> {
        self.list(ArticleListing::Trash { author_id: caller.user_id }, page).await
    }

    /// Published articles carrying any of the tags. Every tag must exist
    /// and not be rejected.
    pub async fn list_by_tags(
        &self,
        tags: &[String],
        page: PageRequest,
    ) -> ArticleResult<Page<Article>> {
        let tags = self.tags.validate(tags).await?;
        if tags.is_empty() {
            return Err(ArticleError::InvalidInput("at least one tag is required".into()));
        }
        self.list(ArticleListing::ByTags(tags), page).await
    }

    /// Text search over title and excerpt. Admins also see unpublished
    /// articles, ranked after the published ones.
    pub async fn search(
        &self,
        caller: Option<&CurrentUser>,
        query: &str,
        page: PageRequest,
    ) -> ArticleResult<Page<Article>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ArticleError::InvalidInput("search query is required".into()));
        }
        let listing = ArticleListing::Search {
            query: query.to_string(),
            include_unpublished: caller.is_some_and(CurrentUser::is_admin),
        };
        self.list(listing, page).await
    }

    /// Published articles narrowed by every supplied criterion.
    pub async fn filter(
        &self,
        input: ArticleFilterInput,
        page: PageRequest,
    ) -> ArticleResult<Page<Article>> {
        if let (Some(after), Some(before)) = (input.published_after, input.published_before)
            && after > before
        {
            return Err(ArticleError::InvalidInput(
                "published_after must not be later than published_before".into(),
            ));
        }
        let filter = ArticleFilter {
            author_id: input.author_id,
            tags: TagName::normalize_all(&input.tags)?,
            language: input
                .language
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(normalize_language)
                .transpose()?,
            published_after: input.published_after,
            published_before: input.published_before,
            sort: input.sort,
        };
        self.list(ArticleListing::Filter(filter), page).await
    }

    /// Most viewed articles published inside the window.
    pub async fn trending(
        &self,
        window_days: Option<i64>,
        page: PageRequest,
    ) -> ArticleResult<Page<Article>> {
        let since = Utc::now() - self.config.trending_window(window_days);
        self.list(ArticleListing::Trending { since }, page).await
    }

    pub async fn newest(&self, page: PageRequest) -> ArticleResult<Page<Article>> {
        self.list(ArticleListing::Newest, page).await
    }

    pub async fn popular(&self, page: PageRequest) -> ArticleResult<Page<Article>> {
        self.list(ArticleListing::Popular, page).await
    }

    /// Admin listing across every status, deleted included.
    pub async fn list_all(
        &self,
        caller: &CurrentUser,
        status: Option<ArticleStatus>,
        page: PageRequest,
    ) -> ArticleResult<Page<Article>> {
        require_admin(caller)?;
        self.list(ArticleListing::All { status }, page).await
    }

    async fn list(
        &self,
        listing: ArticleListing,
        page: PageRequest,
    ) -> ArticleResult<Page<Article>> {
        let page = page.normalized();
        let (items, total) = self.article_repo.list(&listing, page).await?;
        Ok(Page::new(items, total, page))
    }
}
