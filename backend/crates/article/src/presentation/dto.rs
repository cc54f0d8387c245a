//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::id::{ArticleId, TagId, UserId};
use serde::{Deserialize, Serialize};

use crate::application::{ArticleFilterInput, CreateArticleInput, UpdateArticleInput};
use crate::domain::entity::{Article, ArticleStats, ArticleStatus, ClapOutcome, Tag, TagStatus};
use crate::domain::repository::ArticleSort;
use crate::domain::value_object::ContentBlock;

fn default_language() -> String {
    "en".to_string()
}

// ============================================================================
// Articles
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default = "default_language")]
    pub language: String,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(alias = "content_blocks")]
    pub content: Vec<ContentBlock>,
}

impl From<CreateArticleRequest> for CreateArticleInput {
    fn from(req: CreateArticleRequest) -> Self {
        Self {
            title: req.title,
            slug: req.slug,
            excerpt: req.excerpt,
            language: req.language,
            cover_image: req.cover_image,
            tags: req.tags,
            content: req.content,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub language: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(alias = "content_blocks")]
    pub content: Option<Vec<ContentBlock>>,
    pub status: Option<ArticleStatus>,
}

impl From<UpdateArticleRequest> for UpdateArticleInput {
    fn from(req: UpdateArticleRequest) -> Self {
        Self {
            title: req.title,
            slug: req.slug,
            excerpt: req.excerpt,
            language: req.language,
            tags: req.tags,
            content: req.content,
            status: req.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleTimestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleResponse {
    pub article_id: ArticleId,
    pub author_id: UserId,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub language: String,
    pub cover_image: Option<String>,
    pub content: Vec<ContentBlock>,
    pub tags: Vec<String>,
    pub status: ArticleStatus,
    pub stats: ArticleStats,
    pub timestamps: ArticleTimestamps,
    pub version: i64,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            article_id: article.article_id,
            author_id: article.author_id,
            slug: article.slug.as_str().to_string(),
            title: article.title,
            excerpt: article.excerpt,
            language: article.language,
            cover_image: article.cover_image,
            content: article.content,
            tags: article.tags.iter().map(ToString::to_string).collect(),
            status: article.status,
            stats: article.stats,
            timestamps: ArticleTimestamps {
                created_at: article.created_at,
                updated_at: article.updated_at,
                published_at: article.published_at,
                archived_at: article.archived_at,
                deleted_at: article.deleted_at,
            },
            version: article.version,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// `?tags=go,rust`
#[derive(Debug, Clone, Deserialize)]
pub struct TagsQuery {
    #[serde(default)]
    pub tags: String,
}

impl TagsQuery {
    pub fn names(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendingQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterRequest {
    pub author_id: Option<UserId>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub language: Option<String>,
    pub published_after: Option<DateTime<Utc>>,
    pub published_before: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sort: ArticleSort,
}

impl From<FilterRequest> for ArticleFilterInput {
    fn from(req: FilterRequest) -> Self {
        Self {
            author_id: req.author_id,
            tags: req.tags,
            language: req.language,
            published_after: req.published_after,
            published_before: req.published_before,
            sort: req.sort,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusQuery<S> {
    pub status: Option<S>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub instructions: String,
}

// ============================================================================
// Engagement
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ClapResponse {
    pub user_claps: i32,
    pub clap_count: i64,
}

impl From<ClapOutcome> for ClapResponse {
    fn from(outcome: ClapOutcome) -> Self {
        Self {
            user_claps: outcome.user_claps,
            clap_count: outcome.clap_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewResponse {
    pub counted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrashEmptiedResponse {
    pub removed: usize,
}

// ============================================================================
// Tags
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTagRequest {
    #[serde(alias = "tag_name")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagNameQuery {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagApprovalResponse {
    pub name: String,
    pub approved: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagResponse {
    pub tag_id: TagId,
    pub name: String,
    pub status: TagStatus,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            tag_id: tag.tag_id,
            name: tag.name.as_str().to_string(),
            status: tag.status,
            created_by: tag.created_by,
            created_at: tag.created_at,
            updated_at: tag.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_query_splits_and_trims() {
        let query = TagsQuery {
            tags: " go, rust ,,".to_string(),
        };
        assert_eq!(query.names(), vec!["go", "rust"]);
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateArticleRequest = serde_json::from_value(serde_json::json!({
            "title": "Hello",
            "content_blocks": [{"order": 1, "type": "paragraph", "content": {"text": "Hi"}}]
        }))
        .unwrap();
        assert_eq!(req.language, "en");
        assert!(req.tags.is_empty());
        assert_eq!(req.content.len(), 1);
    }
}
