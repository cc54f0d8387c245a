//! Application Configuration
//!
//! Limits and windows for the Article application layer.

use std::time::Duration as StdDuration;

use chrono::Duration;

use crate::domain::policy::ContentPolicy;

pub const MAX_TAGS_PER_ARTICLE: usize = 5;
pub const MAX_CLAPS_PER_USER: i32 = 50;
pub const MAX_ARTICLES_PER_USER: u64 = 1_000;

/// Article application configuration
#[derive(Debug, Clone)]
pub struct ArticleConfig {
    pub max_tags_per_article: usize,
    pub max_claps_per_user: i32,
    /// Non-deleted articles per author
    pub max_articles_per_user: u64,
    /// Repeat views by the same viewer inside this window are not counted
    pub view_dedup_window: Duration,
    pub default_trending_days: i64,
    pub max_trending_days: i64,
    /// Budget for one content-generation call
    pub ai_timeout: StdDuration,
    /// Attempts for a generated slug before giving up on collisions
    pub slug_attempts: usize,
    pub policy: ContentPolicy,
}

impl Default for ArticleConfig {
    fn default() -> Self {
        Self {
            max_tags_per_article: MAX_TAGS_PER_ARTICLE,
            max_claps_per_user: MAX_CLAPS_PER_USER,
            max_articles_per_user: MAX_ARTICLES_PER_USER,
            view_dedup_window: Duration::hours(24),
            default_trending_days: 7,
            max_trending_days: 30,
            ai_timeout: StdDuration::from_secs(30),
            slug_attempts: 3,
            policy: ContentPolicy::default(),
        }
    }
}

impl ArticleConfig {
    /// Clamp a requested trending window into `1..=max_trending_days`.
    pub fn trending_window(&self, days: Option<i64>) -> Duration {
        let days = days
            .unwrap_or(self.default_trending_days)
            .clamp(1, self.max_trending_days);
        Duration::days(days)
    }
}
