//! In-memory article store and scripted content generator for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use kernel::PageRequest;
use kernel::id::{ArticleId, TagId, UserId};

use crate::domain::ai::{AiClient, AiError};
use crate::domain::entity::{Article, ArticleStatus, Clap, ClapOutcome, Tag, TagStatus, View};
use crate::domain::repository::{
    ArticleListing, ArticleRepository, ArticleSort, EngagementRepository, TagRepository,
};
use crate::domain::value_object::{Slug, TagName};
use crate::error::{ArticleError, ArticleResult};

#[derive(Default)]
struct State {
    articles: HashMap<ArticleId, Article>,
    tags: HashMap<TagId, Tag>,
    views: Vec<View>,
    claps: HashMap<(UserId, ArticleId), Clap>,
}

impl State {
    fn bump_views(&mut self, article_id: ArticleId) -> bool {
        match self.articles.get_mut(&article_id) {
            Some(article) => {
                article.stats.view_count += 1;
                true
            }
            None => false,
        }
    }

    fn bump_claps(&mut self, article_id: ArticleId, delta: i64) -> Option<i64> {
        self.articles.get_mut(&article_id).map(|article| {
            article.stats.clap_count += delta;
            article.stats.clap_count
        })
    }

    fn remove_engagement(&mut self, article_id: ArticleId) {
        self.views.retain(|v| v.article_id != article_id);
        self.claps.retain(|(_, a), _| *a != article_id);
    }
}

#[derive(Default)]
pub struct MemoryArticleStore {
    state: Mutex<State>,
}

impl MemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn article(&self, article_id: ArticleId) -> Option<Article> {
        self.state.lock().unwrap().articles.get(&article_id).cloned()
    }

    pub fn view_rows(&self, article_id: ArticleId) -> usize {
        let state = self.state.lock().unwrap();
        state.views.iter().filter(|v| v.article_id == article_id).count()
    }

    pub fn clap_rows(&self, article_id: ArticleId) -> usize {
        let state = self.state.lock().unwrap();
        state.claps.keys().filter(|(_, a)| *a == article_id).count()
    }

    /// Test hook: mutate a stored article in place.
    pub fn edit_article(&self, article_id: ArticleId, f: impl FnOnce(&mut Article)) {
        let mut state = self.state.lock().unwrap();
        if let Some(article) = state.articles.get_mut(&article_id) {
            f(article);
        }
    }

    /// Test hook: age every view row.
    pub fn age_views(&self, by: chrono::Duration) {
        let mut state = self.state.lock().unwrap();
        for view in &mut state.views {
            view.created_at -= by;
        }
    }
}

fn slug_taken(state: &State, slug: &Slug, except: ArticleId) -> bool {
    state
        .articles
        .values()
        .any(|a| a.article_id != except && &a.slug == slug)
}

fn matches_search(article: &Article, query: &str) -> bool {
    let haystack = format!("{} {}", article.title, article.excerpt).to_lowercase();
    query
        .split_whitespace()
        .all(|term| haystack.contains(&term.to_lowercase()))
}

fn matches(article: &Article, listing: &ArticleListing) -> bool {
    let published = article.status == ArticleStatus::Published;
    let deleted = article.status == ArticleStatus::Deleted;
    match listing {
        ArticleListing::ByAuthor { author_id } => article.author_id == *author_id && !deleted,
        ArticleListing::Trash { author_id } => article.author_id == *author_id && deleted,
        ArticleListing::ByTags(tags) => published && article.tags.iter().any(|t| tags.contains(t)),
        ArticleListing::Search {
            query,
            include_unpublished,
        } => {
            matches_search(article, query) && !deleted && (published || *include_unpublished)
        }
        ArticleListing::Filter(filter) => {
            published
                && filter.author_id.is_none_or(|a| a == article.author_id)
                && filter.tags.iter().all(|t| article.tags.contains(t))
                && filter.language.as_ref().is_none_or(|l| l == &article.language)
                && filter
                    .published_after
                    .is_none_or(|after| article.published_at.is_some_and(|p| p >= after))
                && filter
                    .published_before
                    .is_none_or(|before| article.published_at.is_some_and(|p| p <= before))
        }
        ArticleListing::Trending { since } => {
            published && article.published_at.is_some_and(|p| p >= *since)
        }
        ArticleListing::Newest | ArticleListing::Popular => published,
        ArticleListing::All { status } => status.is_none_or(|s| s == article.status),
    }
}

fn sort(items: &mut [Article], listing: &ArticleListing) {
    match listing {
        ArticleListing::ByAuthor { .. } | ArticleListing::All { .. } => {
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        ArticleListing::Trash { .. } => items.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at)),
        ArticleListing::ByTags(_) | ArticleListing::Newest => {
            items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        }
        ArticleListing::Search { .. } => items.sort_by(|a, b| {
            b.is_published()
                .cmp(&a.is_published())
                .then(b.created_at.cmp(&a.created_at))
        }),
        ArticleListing::Filter(filter) => match filter.sort {
            ArticleSort::Newest => items.sort_by(|a, b| b.published_at.cmp(&a.published_at)),
            ArticleSort::Oldest => items.sort_by(|a, b| a.published_at.cmp(&b.published_at)),
            ArticleSort::MostViewed => items.sort_by(|a, b| {
                b.stats
                    .view_count
                    .cmp(&a.stats.view_count)
                    .then(b.published_at.cmp(&a.published_at))
            }),
            ArticleSort::MostClapped => items.sort_by(|a, b| {
                b.stats
                    .clap_count
                    .cmp(&a.stats.clap_count)
                    .then(b.published_at.cmp(&a.published_at))
            }),
        },
        ArticleListing::Trending { .. } => items.sort_by(|a, b| {
            b.stats
                .view_count
                .cmp(&a.stats.view_count)
                .then(b.published_at.cmp(&a.published_at))
        }),
        ArticleListing::Popular => items.sort_by(|a, b| {
            b.stats
                .clap_count
                .cmp(&a.stats.clap_count)
                .then(b.stats.view_count.cmp(&a.stats.view_count))
                .then(b.published_at.cmp(&a.published_at))
        }),
    }
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> (Vec<T>, u64) {
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    (items, total)
}

impl ArticleRepository for MemoryArticleStore {
    async fn insert(&self, article: &Article) -> ArticleResult<()> {
        let mut state = self.state.lock().unwrap();
        if slug_taken(&state, &article.slug, article.article_id) {
            return Err(ArticleError::DuplicateArticleSlug);
        }
        state.articles.insert(article.article_id, article.clone());
        Ok(())
    }

    async fn update(&self, article: &Article, expected_version: i64) -> ArticleResult<()> {
        let mut state = self.state.lock().unwrap();
        let stored_version = match state.articles.get(&article.article_id) {
            None => return Err(ArticleError::NotFound),
            Some(stored) => stored.version,
        };
        if stored_version != expected_version {
            return Err(ArticleError::Conflict);
        }
        if slug_taken(&state, &article.slug, article.article_id) {
            return Err(ArticleError::DuplicateArticleSlug);
        }
        if let Some(stored) = state.articles.get_mut(&article.article_id) {
            stored.slug = article.slug.clone();
            stored.title = article.title.clone();
            stored.excerpt = article.excerpt.clone();
            stored.language = article.language.clone();
            stored.cover_image = article.cover_image.clone();
            stored.content = article.content.clone();
            stored.tags = article.tags.clone();
            stored.status = article.status;
            stored.archived_at = article.archived_at;
            stored.updated_at = article.updated_at;
            stored.version += 1;
        }
        Ok(())
    }

    async fn transition(&self, article: &Article, previous: ArticleStatus) -> ArticleResult<bool> {
        let mut state = self.state.lock().unwrap();
        match state.articles.get_mut(&article.article_id) {
            Some(stored) if stored.status == previous => {
                stored.status = article.status;
                stored.published_at = article.published_at;
                stored.archived_at = article.archived_at;
                stored.deleted_at = article.deleted_at;
                stored.updated_at = article.updated_at;
                stored.version += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_by_id(&self, article_id: ArticleId) -> ArticleResult<Option<Article>> {
        Ok(self.article(article_id))
    }

    async fn find_by_slug(&self, slug: &Slug) -> ArticleResult<Option<Article>> {
        let state = self.state.lock().unwrap();
        Ok(state.articles.values().find(|a| &a.slug == slug).cloned())
    }

    async fn slug_exists(&self, slug: &Slug) -> ArticleResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.articles.values().any(|a| &a.slug == slug))
    }

    async fn count_by_author(&self, author_id: UserId) -> ArticleResult<u64> {
        let state = self.state.lock().unwrap();
        Ok(state
            .articles
            .values()
            .filter(|a| a.author_id == author_id && a.status != ArticleStatus::Deleted)
            .count() as u64)
    }

    async fn list(
        &self,
        listing: &ArticleListing,
        page: PageRequest,
    ) -> ArticleResult<(Vec<Article>, u64)> {
        let state = self.state.lock().unwrap();
        let mut items: Vec<Article> = state
            .articles
            .values()
            .filter(|a| matches(a, listing))
            .cloned()
            .collect();
        sort(&mut items, listing);
        Ok(paginate(items, page))
    }

    async fn hard_delete(&self, article_id: ArticleId) -> ArticleResult<bool> {
        let mut state = self.state.lock().unwrap();
        if state.articles.remove(&article_id).is_none() {
            return Ok(false);
        }
        state.remove_engagement(article_id);
        Ok(true)
    }

    async fn empty_trash(&self, author_id: UserId) -> ArticleResult<Vec<ArticleId>> {
        let mut state = self.state.lock().unwrap();
        let ids: Vec<ArticleId> = state
            .articles
            .values()
            .filter(|a| a.author_id == author_id && a.status == ArticleStatus::Deleted)
            .map(|a| a.article_id)
            .collect();
        for id in &ids {
            state.articles.remove(id);
            state.remove_engagement(*id);
        }
        Ok(ids)
    }

    async fn delete_from_trash(
        &self,
        article_id: ArticleId,
        author_id: UserId,
    ) -> ArticleResult<bool> {
        let mut state = self.state.lock().unwrap();
        let removable = state
            .articles
            .get(&article_id)
            .is_some_and(|a| a.author_id == author_id && a.status == ArticleStatus::Deleted);
        if removable {
            state.articles.remove(&article_id);
            state.remove_engagement(article_id);
        }
        Ok(removable)
    }

    async fn increment_view(&self, article_id: ArticleId) -> ArticleResult<bool> {
        Ok(self.state.lock().unwrap().bump_views(article_id))
    }

    async fn update_clap_count(
        &self,
        article_id: ArticleId,
        delta: i64,
    ) -> ArticleResult<Option<i64>> {
        Ok(self.state.lock().unwrap().bump_claps(article_id, delta))
    }

    async fn reset_stats(&self, article_id: ArticleId, clap_count: i64) -> ArticleResult<bool> {
        let mut state = self.state.lock().unwrap();
        match state.articles.get_mut(&article_id) {
            Some(article) => {
                article.stats.view_count = 0;
                article.stats.clap_count = clap_count;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl TagRepository for MemoryArticleStore {
    async fn create(&self, tag: &Tag) -> ArticleResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.tags.values().any(|t| t.name == tag.name) {
            return Err(ArticleError::TagAlreadyExists);
        }
        state.tags.insert(tag.tag_id, tag.clone());
        Ok(())
    }

    async fn find_by_id(&self, tag_id: TagId) -> ArticleResult<Option<Tag>> {
        Ok(self.state.lock().unwrap().tags.get(&tag_id).cloned())
    }

    async fn find_by_names(&self, names: &[TagName]) -> ArticleResult<Vec<Tag>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tags
            .values()
            .filter(|t| names.contains(&t.name))
            .cloned()
            .collect())
    }

    async fn set_status(&self, tag_id: TagId, status: TagStatus) -> ArticleResult<Option<Tag>> {
        let mut state = self.state.lock().unwrap();
        Ok(state.tags.get_mut(&tag_id).map(|tag| {
            tag.status = status;
            tag.updated_at = Utc::now();
            tag.clone()
        }))
    }

    async fn delete(&self, tag_id: TagId) -> ArticleResult<bool> {
        Ok(self.state.lock().unwrap().tags.remove(&tag_id).is_some())
    }

    async fn list(
        &self,
        status: Option<TagStatus>,
        page: PageRequest,
    ) -> ArticleResult<(Vec<Tag>, u64)> {
        let state = self.state.lock().unwrap();
        let mut tags: Vec<Tag> = state
            .tags
            .values()
            .filter(|t| status.is_none_or(|s| s == t.status))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(tags, page))
    }
}

impl EngagementRepository for MemoryArticleStore {
    async fn record_view(&self, view: &View, window_start: DateTime<Utc>) -> ArticleResult<bool> {
        let mut state = self.state.lock().unwrap();
        let seen = state.views.iter().any(|v| {
            v.article_id == view.article_id
                && v.viewer_key == view.viewer_key
                && v.created_at > window_start
        });
        if seen {
            return Ok(false);
        }
        state.views.push(view.clone());
        state.bump_views(view.article_id);
        Ok(true)
    }

    async fn add_clap(
        &self,
        user_id: UserId,
        article_id: ArticleId,
        max_claps: i32,
    ) -> ArticleResult<Option<ClapOutcome>> {
        let mut state = self.state.lock().unwrap();
        if !state.articles.contains_key(&article_id) {
            return Err(ArticleError::NotFound);
        }
        let now = Utc::now();
        let clap = state.claps.entry((user_id, article_id)).or_insert(Clap {
            user_id,
            article_id,
            count: 0,
            created_at: now,
            updated_at: now,
        });
        if clap.count >= max_claps {
            return Ok(None);
        }
        clap.count += 1;
        clap.updated_at = now;
        let user_claps = clap.count;

        let clap_count = state.bump_claps(article_id, 1).ok_or(ArticleError::NotFound)?;
        Ok(Some(ClapOutcome {
            user_claps,
            clap_count,
        }))
    }

    async fn user_claps(&self, user_id: UserId, article_id: ArticleId) -> ArticleResult<i32> {
        let state = self.state.lock().unwrap();
        Ok(state
            .claps
            .get(&(user_id, article_id))
            .map(|c| c.count)
            .unwrap_or(0))
    }

    async fn total_claps(&self, article_id: ArticleId) -> ArticleResult<i64> {
        let state = self.state.lock().unwrap();
        Ok(state
            .claps
            .values()
            .filter(|c| c.article_id == article_id)
            .map(|c| i64::from(c.count))
            .sum())
    }

    async fn purge_views_before(&self, cutoff: DateTime<Utc>) -> ArticleResult<u64> {
        let mut state = self.state.lock().unwrap();
        let before = state.views.len();
        state.views.retain(|v| v.created_at >= cutoff);
        Ok((before - state.views.len()) as u64)
    }
}

/// Replays queued answers in order; `Disabled` once the script runs out.
#[derive(Default)]
pub struct ScriptedAiClient {
    answers: Mutex<VecDeque<Result<String, AiError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedAiClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, answer: Result<&str, AiError>) {
        self.answers
            .lock()
            .unwrap()
            .push_back(answer.map(str::to_string));
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl AiClient for ScriptedAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(AiError::Disabled))
    }
}
