//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the infra layer.

use chrono::{DateTime, Utc};
use kernel::PageRequest;
use kernel::id::{ArticleId, TagId, UserId};
use serde::Deserialize;

use crate::domain::entity::{Article, ArticleStatus, ClapOutcome, Tag, TagStatus, View};
use crate::domain::value_object::{Slug, TagName};
use crate::error::ArticleResult;

/// Sort orders accepted by the public filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleSort {
    #[default]
    Newest,
    Oldest,
    MostViewed,
    MostClapped,
}

/// Public filter over published articles. Every field narrows the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleFilter {
    pub author_id: Option<UserId>,
    /// Article must carry every listed tag
    pub tags: Vec<TagName>,
    pub language: Option<String>,
    pub published_after: Option<DateTime<Utc>>,
    pub published_before: Option<DateTime<Utc>>,
    pub sort: ArticleSort,
}

/// Paginated read models over the articles table.
#[derive(Debug, Clone, PartialEq)]
pub enum ArticleListing {
    /// An author's non-deleted articles, newest first
    ByAuthor { author_id: UserId },
    /// An author's deleted articles, most recently deleted first
    Trash { author_id: UserId },
    /// Published articles carrying any of the tags
    ByTags(Vec<TagName>),
    /// Title / excerpt text search; published first, deleted never
    Search {
        query: String,
        include_unpublished: bool,
    },
    Filter(ArticleFilter),
    /// Published since the cutoff, most viewed first
    Trending { since: DateTime<Utc> },
    /// Published, most recent publication first
    Newest,
    /// Published, most clapped first
    Popular,
    /// Any status including deleted (admin)
    All { status: Option<ArticleStatus> },
}

/// Article repository trait
#[trait_variant::make(ArticleRepository: Send)]
pub trait LocalArticleRepository {
    /// Fails with `DuplicateArticleSlug` on a slug collision
    async fn insert(&self, article: &Article) -> ArticleResult<()>;

    /// Write editable fields and status when the stored version still equals
    /// `expected_version`. `NotFound` / `Conflict` otherwise.
    async fn update(&self, article: &Article, expected_version: i64) -> ArticleResult<()>;

    /// Compare-and-swap on status: writes the status and lifecycle
    /// timestamps only if the stored status is still `previous`.
    async fn transition(&self, article: &Article, previous: ArticleStatus) -> ArticleResult<bool>;

    async fn find_by_id(&self, article_id: ArticleId) -> ArticleResult<Option<Article>>;

    async fn find_by_slug(&self, slug: &Slug) -> ArticleResult<Option<Article>>;

    async fn slug_exists(&self, slug: &Slug) -> ArticleResult<bool>;

    /// Non-deleted articles of the author
    async fn count_by_author(&self, author_id: UserId) -> ArticleResult<u64>;

    async fn list(
        &self,
        listing: &ArticleListing,
        page: PageRequest,
    ) -> ArticleResult<(Vec<Article>, u64)>;

    /// Physical removal together with the article's views and claps, in
    /// one transaction
    async fn hard_delete(&self, article_id: ArticleId) -> ArticleResult<bool>;

    /// Physically remove the author's deleted articles and their views and
    /// claps in one transaction; returns the removed ids
    async fn empty_trash(&self, author_id: UserId) -> ArticleResult<Vec<ArticleId>>;

    /// Physically remove one deleted article of the author, engagement
    /// included
    async fn delete_from_trash(
        &self,
        article_id: ArticleId,
        author_id: UserId,
    ) -> ArticleResult<bool>;

    /// Atomic `view_count + 1`
    async fn increment_view(&self, article_id: ArticleId) -> ArticleResult<bool>;

    /// Atomic `clap_count + delta`; returns the new total
    async fn update_clap_count(
        &self,
        article_id: ArticleId,
        delta: i64,
    ) -> ArticleResult<Option<i64>>;

    /// Admin reset: views to zero, claps to the recomputed aggregate
    async fn reset_stats(&self, article_id: ArticleId, clap_count: i64) -> ArticleResult<bool>;
}

/// Tag repository trait
#[trait_variant::make(TagRepository: Send)]
pub trait LocalTagRepository {
    /// Fails with `TagAlreadyExists` on a name collision
    async fn create(&self, tag: &Tag) -> ArticleResult<()>;

    async fn find_by_id(&self, tag_id: TagId) -> ArticleResult<Option<Tag>>;

    async fn find_by_names(&self, names: &[TagName]) -> ArticleResult<Vec<Tag>>;

    async fn set_status(&self, tag_id: TagId, status: TagStatus) -> ArticleResult<Option<Tag>>;

    async fn delete(&self, tag_id: TagId) -> ArticleResult<bool>;

    async fn list(
        &self,
        status: Option<TagStatus>,
        page: PageRequest,
    ) -> ArticleResult<(Vec<Tag>, u64)>;
}

/// Views and claps
#[trait_variant::make(EngagementRepository: Send)]
pub trait LocalEngagementRepository {
    /// Insert unless the same viewer already viewed the article since
    /// `window_start`. A written row bumps `view_count` in the same
    /// transaction. Returns whether the view counted.
    async fn record_view(&self, view: &View, window_start: DateTime<Utc>) -> ArticleResult<bool>;

    /// Add one clap to the (user, article) aggregate if it is below
    /// `max_claps`, bumping `clap_count` in the same transaction. `None` at
    /// the ceiling, `NotFound` when the article row is gone.
    async fn add_clap(
        &self,
        user_id: UserId,
        article_id: ArticleId,
        max_claps: i32,
    ) -> ArticleResult<Option<ClapOutcome>>;

    async fn user_claps(&self, user_id: UserId, article_id: ArticleId) -> ArticleResult<i32>;

    /// Sum of every user's claps on the article
    async fn total_claps(&self, article_id: ArticleId) -> ArticleResult<i64>;

    async fn purge_views_before(&self, cutoff: DateTime<Utc>) -> ArticleResult<u64>;
}

/// Everything the article handlers need from one backing store.
pub trait ArticleStore:
    ArticleRepository + TagRepository + EngagementRepository + Send + Sync + 'static
{
}

impl<T> ArticleStore for T where
    T: ArticleRepository + TagRepository + EngagementRepository + Send + Sync + 'static
{
}
