//! Article Entity
//!
//! Lifecycle (rows: current status):
//!
//! | from      | publish | unpublish | archive | unarchive | delete  | restore |
//! |-----------|---------|-----------|---------|-----------|---------|---------|
//! | draft     | published | err     | archived | err      | deleted | err     |
//! | published | err     | draft     | archived | err      | deleted | err     |
//! | archived  | err     | err       | err     | draft     | deleted | err     |
//! | deleted   | err     | err       | err     | err       | err     | draft   |
//!
//! Timestamps follow the status: `published_at` once ever published,
//! `archived_at` only while archived, `deleted_at` only while deleted.

use chrono::{DateTime, Utc};
use kernel::CurrentUser;
use kernel::id::{ArticleId, UserId};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{
    ContentBlock, MAX_CONTENT_LENGTH, MAX_TITLE_LENGTH, Slug, TagName,
};
use crate::error::{ArticleError, ArticleResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Draft,
    Published,
    Archived,
    Deleted,
}

impl ArticleStatus {
    /// Database representation
    pub const fn id(&self) -> i16 {
        match self {
            ArticleStatus::Draft => 1,
            ArticleStatus::Published => 2,
            ArticleStatus::Archived => 3,
            ArticleStatus::Deleted => 4,
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(ArticleStatus::Draft),
            2 => Some(ArticleStatus::Published),
            3 => Some(ArticleStatus::Archived),
            4 => Some(ArticleStatus::Deleted),
            _ => None,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
            ArticleStatus::Archived => "archived",
            ArticleStatus::Deleted => "deleted",
        }
    }
}

/// Status-changing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Publish,
    Unpublish,
    Archive,
    Unarchive,
    Delete,
    Restore,
}

impl Transition {
    pub const fn name(&self) -> &'static str {
        match self {
            Transition::Publish => "publish",
            Transition::Unpublish => "unpublish",
            Transition::Archive => "archive",
            Transition::Unarchive => "unarchive",
            Transition::Delete => "delete",
            Transition::Restore => "restore",
        }
    }

    /// Target status, or the error for an illegal move out of `from`.
    pub fn target(&self, from: ArticleStatus) -> ArticleResult<ArticleStatus> {
        use ArticleStatus::*;
        match (*self, from) {
            (Transition::Restore, Deleted) => Ok(Draft),
            (Transition::Restore, _) => Err(ArticleError::NotDeleted),
            (_, Deleted) => Err(ArticleError::AlreadyDeleted),

            (Transition::Publish, Draft) => Ok(Published),
            (Transition::Publish, Published) => Err(ArticleError::AlreadyPublished),
            (Transition::Publish, Archived) => Err(ArticleError::AlreadyArchived),

            (Transition::Unpublish, Published) => Ok(Draft),
            (Transition::Unpublish, _) => Err(ArticleError::NotPublished),

            (Transition::Archive, Draft | Published) => Ok(Archived),
            (Transition::Archive, Archived) => Err(ArticleError::AlreadyArchived),

            (Transition::Unarchive, Archived) => Ok(Draft),
            (Transition::Unarchive, _) => Err(ArticleError::NotArchived),

            (Transition::Delete, _) => Ok(Deleted),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleStats {
    pub view_count: i64,
    pub clap_count: i64,
}

/// Fields supplied when an article is first drafted.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub author_id: UserId,
    pub slug: Slug,
    pub title: String,
    pub excerpt: String,
    pub language: String,
    pub cover_image: Option<String>,
    pub content: Vec<ContentBlock>,
    pub tags: Vec<TagName>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub article_id: ArticleId,
    pub author_id: UserId,
    pub slug: Slug,
    pub title: String,
    pub excerpt: String,
    pub language: String,
    pub cover_image: Option<String>,
    pub content: Vec<ContentBlock>,
    pub tags: Vec<TagName>,
    pub status: ArticleStatus,
    pub stats: ArticleStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    /// Bumped on every write; guards content updates
    pub version: i64,
}

impl Article {
    pub fn draft(new: NewArticle) -> Self {
        let now = Utc::now();
        Self {
            article_id: ArticleId::new(),
            author_id: new.author_id,
            slug: new.slug,
            title: new.title,
            excerpt: new.excerpt,
            language: new.language,
            cover_image: new.cover_image,
            content: new.content,
            tags: new.tags,
            status: ArticleStatus::Draft,
            stats: ArticleStats::default(),
            created_at: now,
            updated_at: now,
            published_at: None,
            archived_at: None,
            deleted_at: None,
            version: 1,
        }
    }

    /// Apply a lifecycle move in memory. Returns the previous status, which
    /// the store uses as the compare-and-swap guard.
    pub fn apply(
        &mut self,
        transition: Transition,
        now: DateTime<Utc>,
    ) -> ArticleResult<ArticleStatus> {
        let previous = self.status;
        let next = transition.target(previous)?;

        match next {
            ArticleStatus::Published => {
                self.published_at.get_or_insert(now);
            }
            ArticleStatus::Archived => self.archived_at = Some(now),
            ArticleStatus::Deleted => self.deleted_at = Some(now),
            ArticleStatus::Draft => {}
        }
        if next != ArticleStatus::Archived {
            self.archived_at = None;
        }
        if next != ArticleStatus::Deleted {
            self.deleted_at = None;
        }

        self.status = next;
        self.updated_at = now;
        Ok(previous)
    }

    #[inline]
    pub fn is_published(&self) -> bool {
        self.status == ArticleStatus::Published
    }

    #[inline]
    pub fn ever_published(&self) -> bool {
        self.published_at.is_some()
    }

    /// Published articles are public; everything else is owner / admin only.
    pub fn is_visible_to(&self, caller: Option<&CurrentUser>) -> bool {
        self.is_published() || caller.is_some_and(|c| c.can_act_on(self.author_id))
    }
}

/// Trimmed, non-empty, at most `MAX_TITLE_LENGTH` characters.
pub fn normalize_title(title: &str) -> ArticleResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ArticleError::InvalidInput("title is required".into()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ArticleError::InvalidInput(format!(
            "title must be at most {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(title.to_string())
}

pub fn normalize_excerpt(excerpt: &str) -> ArticleResult<String> {
    let excerpt = excerpt.trim();
    if excerpt.chars().count() > MAX_CONTENT_LENGTH {
        return Err(ArticleError::InvalidInput(format!(
            "excerpt must be at most {} characters",
            MAX_CONTENT_LENGTH
        )));
    }
    Ok(excerpt.to_string())
}

/// Two-letter ISO 639-1 code, lower-cased.
pub fn normalize_language(language: &str) -> ArticleResult<String> {
    let language = language.trim().to_ascii_lowercase();
    if language.len() != 2 || !language.bytes().all(|b| b.is_ascii_lowercase()) {
        return Err(ArticleError::InvalidInput(
            "language must be a two-letter code".into(),
        ));
    }
    Ok(language)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::UserRole;

    fn article() -> Article {
        Article::draft(NewArticle {
            author_id: UserId::new(),
            slug: Slug::new("hello").unwrap(),
            title: "Hello".into(),
            excerpt: String::new(),
            language: "en".into(),
            cover_image: None,
            content: vec![ContentBlock::paragraph(1, "body")],
            tags: Vec::new(),
        })
    }

    #[test]
    fn test_transition_table() {
        use ArticleStatus::*;
        let moves = [
            Transition::Publish,
            Transition::Unpublish,
            Transition::Archive,
            Transition::Unarchive,
            Transition::Delete,
            Transition::Restore,
        ];
        let expected: [(ArticleStatus, [Option<ArticleStatus>; 6]); 4] = [
            (Draft, [Some(Published), None, Some(Archived), None, Some(Deleted), None]),
            (Published, [None, Some(Draft), Some(Archived), None, Some(Deleted), None]),
            (Archived, [None, None, None, Some(Draft), Some(Deleted), None]),
            (Deleted, [None, None, None, None, None, Some(Draft)]),
        ];
        for (from, row) in expected {
            for (transition, target) in moves.iter().zip(row) {
                assert_eq!(
                    transition.target(from).ok(),
                    target,
                    "{} from {}",
                    transition.name(),
                    from.code()
                );
            }
        }
    }

    #[test]
    fn test_transition_errors() {
        use ArticleStatus::*;
        assert!(matches!(
            Transition::Publish.target(Published),
            Err(ArticleError::AlreadyPublished)
        ));
        assert!(matches!(Transition::Unpublish.target(Draft), Err(ArticleError::NotPublished)));
        assert!(matches!(Transition::Archive.target(Archived), Err(ArticleError::AlreadyArchived)));
        assert!(matches!(Transition::Unarchive.target(Published), Err(ArticleError::NotArchived)));
        assert!(matches!(Transition::Delete.target(Deleted), Err(ArticleError::AlreadyDeleted)));
        assert!(matches!(Transition::Restore.target(Draft), Err(ArticleError::NotDeleted)));
    }

    #[test]
    fn test_timestamps_follow_status() {
        let mut a = article();
        let now = Utc::now();

        a.apply(Transition::Publish, now).unwrap();
        assert_eq!(a.published_at, Some(now));

        a.apply(Transition::Archive, now).unwrap();
        assert!(a.archived_at.is_some());

        a.apply(Transition::Delete, now).unwrap();
        assert!(a.archived_at.is_none());
        assert!(a.deleted_at.is_some());

        a.apply(Transition::Restore, now).unwrap();
        assert_eq!(a.status, ArticleStatus::Draft);
        assert!(a.deleted_at.is_none());
        // Still counts as ever published
        assert!(a.ever_published());
    }

    #[test]
    fn test_republish_keeps_first_publication_time() {
        let mut a = article();
        let first = Utc::now();
        a.apply(Transition::Publish, first).unwrap();
        a.apply(Transition::Unpublish, first).unwrap();
        a.apply(Transition::Publish, first + chrono::Duration::hours(1)).unwrap();
        assert_eq!(a.published_at, Some(first));
    }

    #[test]
    fn test_visibility() {
        let mut a = article();
        let author = CurrentUser::new(a.author_id, UserRole::User);
        let stranger = CurrentUser::new(UserId::new(), UserRole::User);
        let admin = CurrentUser::new(UserId::new(), UserRole::Admin);

        assert!(a.is_visible_to(Some(&author)));
        assert!(a.is_visible_to(Some(&admin)));
        assert!(!a.is_visible_to(Some(&stranger)));
        assert!(!a.is_visible_to(None));

        a.apply(Transition::Publish, Utc::now()).unwrap();
        assert!(a.is_visible_to(None));
    }

    #[test]
    fn test_field_normalization() {
        assert_eq!(normalize_title("  Hi  ").unwrap(), "Hi");
        assert!(normalize_title("   ").is_err());
        assert!(normalize_title(&"x".repeat(151)).is_err());
        assert_eq!(normalize_language("EN").unwrap(), "en");
        assert!(normalize_language("eng").is_err());
        assert!(normalize_language("e1").is_err());
    }
}
