//! Engagement Records
//!
//! - `View`: one impression, kept for the dedup window
//! - `Clap`: running per-(user, article) aggregate

use chrono::{DateTime, Utc};
use kernel::id::{ArticleId, UserId};
use uuid::Uuid;

/// Who a view is attributed to for deduplication: the signed-in user,
/// otherwise the client IP. A request with neither is its own viewer and is
/// never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViewerKey {
    User(UserId),
    Ip(String),
    Request(Uuid),
}

impl ViewerKey {
    pub fn new(user_id: Option<UserId>, ip: Option<&str>, request_id: Uuid) -> Self {
        match (user_id, ip) {
            (Some(user_id), _) => ViewerKey::User(user_id),
            (None, Some(ip)) => ViewerKey::Ip(ip.to_string()),
            (None, None) => ViewerKey::Request(request_id),
        }
    }

    /// Stored form, unique per viewer.
    pub fn as_key(&self) -> String {
        match self {
            ViewerKey::User(user_id) => format!("user:{}", user_id),
            ViewerKey::Ip(ip) => format!("ip:{}", ip),
            ViewerKey::Request(id) => format!("request:{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub view_id: Uuid,
    pub article_id: ArticleId,
    pub user_id: Option<UserId>,
    pub ip: Option<String>,
    pub viewer_key: String,
    pub created_at: DateTime<Utc>,
}

impl View {
    pub fn new(article_id: ArticleId, user_id: Option<UserId>, ip: Option<String>) -> Self {
        let view_id = Uuid::new_v4();
        let viewer_key = ViewerKey::new(user_id, ip.as_deref(), view_id).as_key();
        Self {
            view_id,
            article_id,
            user_id,
            ip,
            viewer_key,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clap {
    pub user_id: UserId,
    pub article_id: ArticleId,
    pub count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of one clap: the caller's running count and the article total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClapOutcome {
    pub user_claps: i32,
    pub clap_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_key_prefers_user() {
        let user_id = UserId::new();
        let request_id = Uuid::new_v4();
        assert_eq!(
            ViewerKey::new(Some(user_id), Some("10.0.0.1"), request_id),
            ViewerKey::User(user_id)
        );
        assert_eq!(
            ViewerKey::new(None, Some("10.0.0.1"), request_id).as_key(),
            "ip:10.0.0.1"
        );
        assert_eq!(
            ViewerKey::new(None, None, request_id),
            ViewerKey::Request(request_id)
        );
    }

    #[test]
    fn test_view_carries_key() {
        let view = View::new(ArticleId::new(), None, Some("10.0.0.1".into()));
        assert_eq!(view.viewer_key, "ip:10.0.0.1");
    }

    #[test]
    fn test_unidentified_views_never_share_a_key() {
        let article_id = ArticleId::new();
        let first = View::new(article_id, None, None);
        let second = View::new(article_id, None, None);
        assert_ne!(first.viewer_key, second.viewer_key);
        assert_eq!(first.viewer_key, format!("request:{}", first.view_id));
    }
}
