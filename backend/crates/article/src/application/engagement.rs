//! Engagement Use Case
//!
//! Views and claps on published articles. The engagement row and the
//! counter on the article row are written by one store call, so a cancelled
//! request never leaves one without the other.

use std::sync::Arc;

use chrono::Utc;
use kernel::CurrentUser;
use kernel::id::{ArticleId, UserId};
use serde::Serialize;

use crate::application::access::require_admin;
use crate::application::config::ArticleConfig;
use crate::domain::entity::{Article, ArticleStats, ClapOutcome, View};
use crate::domain::repository::{ArticleRepository, EngagementRepository};
use crate::error::{ArticleError, ArticleResult};

/// Counters plus the caller's own clap count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngagementStats {
    pub view_count: i64,
    pub clap_count: i64,
    pub user_claps: i32,
}

/// Record a view unless the same viewer was already counted inside the
/// dedup window. Returns whether the view counted.
pub(crate) async fn record_view<E>(
    engagement_repo: &E,
    config: &ArticleConfig,
    article: &Article,
    viewer_id: Option<UserId>,
    ip: Option<String>,
) -> ArticleResult<bool>
where
    E: EngagementRepository,
{
    let view = View::new(article.article_id, viewer_id, ip);
    let window_start = view.created_at - config.view_dedup_window;
    engagement_repo.record_view(&view, window_start).await
}

/// Engagement Use Case
pub struct EngagementUseCase<A, E>
where
    A: ArticleRepository,
    E: EngagementRepository,
{
    article_repo: Arc<A>,
    engagement_repo: Arc<E>,
    config: Arc<ArticleConfig>,
}

impl<A, E> EngagementUseCase<A, E>
where
    A: ArticleRepository,
    E: EngagementRepository,
{
    pub fn new(article_repo: Arc<A>, engagement_repo: Arc<E>, config: Arc<ArticleConfig>) -> Self {
        Self {
            article_repo,
            engagement_repo,
            config,
        }
    }

    pub async fn view(
        &self,
        article_id: ArticleId,
        viewer_id: Option<UserId>,
        ip: Option<String>,
    ) -> ArticleResult<bool> {
        let article = self.published(article_id).await?;
        record_view(
            self.engagement_repo.as_ref(),
            &self.config,
            &article,
            viewer_id,
            ip,
        )
        .await
    }

    /// One more clap from `caller`, up to the per-user ceiling.
    pub async fn clap(
        &self,
        caller: &CurrentUser,
        article_id: ArticleId,
    ) -> ArticleResult<ClapOutcome> {
        self.published(article_id).await?;

        let Some(outcome) = self
            .engagement_repo
            .add_clap(caller.user_id, article_id, self.config.max_claps_per_user)
            .await?
        else {
            tracing::debug!(
                article_id = %article_id,
                user_id = %caller.user_id,
                "Clap ceiling reached"
            );
            return Err(ArticleError::ClapLimitExceeded);
        };

        tracing::debug!(
            article_id = %article_id,
            user_id = %caller.user_id,
            user_claps = outcome.user_claps,
            clap_count = outcome.clap_count,
            "Clap recorded"
        );
        Ok(outcome)
    }

    /// Sum of every reader's claps, straight from the aggregates.
    pub async fn article_clap_count(&self, article_id: ArticleId) -> ArticleResult<i64> {
        self.engagement_repo.total_claps(article_id).await
    }

    pub async fn stats(
        &self,
        caller: Option<&CurrentUser>,
        article_id: ArticleId,
    ) -> ArticleResult<EngagementStats> {
        let article = self
            .article_repo
            .find_by_id(article_id)
            .await?
            .filter(|article| article.is_visible_to(caller))
            .ok_or(ArticleError::NotFound)?;

        let user_claps = match caller {
            Some(caller) => self.engagement_repo.user_claps(caller.user_id, article_id).await?,
            None => 0,
        };

        Ok(EngagementStats {
            view_count: article.stats.view_count,
            clap_count: article.stats.clap_count,
            user_claps,
        })
    }

    /// Admin repair: views back to zero, claps recomputed from the aggregates.
    pub async fn reset_stats(
        &self,
        caller: &CurrentUser,
        article_id: ArticleId,
    ) -> ArticleResult<ArticleStats> {
        require_admin(caller)?;
        let clap_count = self.engagement_repo.total_claps(article_id).await?;
        if !self.article_repo.reset_stats(article_id, clap_count).await? {
            return Err(ArticleError::NotFound);
        }

        tracing::info!(
            article_id = %article_id,
            user_id = %caller.user_id,
            clap_count,
            "Article stats reset"
        );
        Ok(ArticleStats {
            view_count: 0,
            clap_count,
        })
    }

    /// Drop view rows that have left the dedup window.
    pub async fn purge_expired_views(&self) -> ArticleResult<u64> {
        let cutoff = Utc::now() - self.config.view_dedup_window;
        self.engagement_repo.purge_views_before(cutoff).await
    }

    async fn published(&self, article_id: ArticleId) -> ArticleResult<Article> {
        self.article_repo
            .find_by_id(article_id)
            .await?
            .filter(Article::is_published)
            .ok_or(ArticleError::NotFound)
    }
}
