//! Article Lifecycle Use Case
//!
//! Status moves are computed in memory and written as a compare-and-swap on
//! the previous status, so of two racing transitions only one lands. The
//! loser re-reads and gets the error its move would raise against the new
//! status.

use std::sync::Arc;

use chrono::Utc;
use kernel::CurrentUser;
use kernel::id::ArticleId;

use crate::application::access::{load_for_caller, require_admin};
use crate::application::tags::unapproved_tags;
use crate::domain::entity::{Article, Transition};
use crate::domain::repository::{ArticleRepository, TagRepository};
use crate::error::{ArticleError, ArticleResult};

/// Article Lifecycle Use Case
pub struct LifecycleUseCase<A, T>
where
    A: ArticleRepository,
    T: TagRepository,
{
    article_repo: Arc<A>,
    tag_repo: Arc<T>,
}

impl<A, T> LifecycleUseCase<A, T>
where
    A: ArticleRepository,
    T: TagRepository,
{
    pub fn new(article_repo: Arc<A>, tag_repo: Arc<T>) -> Self {
        Self {
            article_repo,
            tag_repo,
        }
    }

    /// Draft to published. Every tag must be approved.
    pub async fn publish(
        &self,
        caller: &CurrentUser,
        article_id: ArticleId,
    ) -> ArticleResult<Article> {
        self.owned_transition(caller, article_id, Transition::Publish).await
    }

    pub async fn unpublish(
        &self,
        caller: &CurrentUser,
        article_id: ArticleId,
    ) -> ArticleResult<Article> {
        self.owned_transition(caller, article_id, Transition::Unpublish).await
    }

    pub async fn archive(
        &self,
        caller: &CurrentUser,
        article_id: ArticleId,
    ) -> ArticleResult<Article> {
        self.owned_transition(caller, article_id, Transition::Archive).await
    }

    pub async fn unarchive(
        &self,
        caller: &CurrentUser,
        article_id: ArticleId,
    ) -> ArticleResult<Article> {
        self.owned_transition(caller, article_id, Transition::Unarchive).await
    }

    /// Soft delete into the author's trash.
    pub async fn delete(
        &self,
        caller: &CurrentUser,
        article_id: ArticleId,
    ) -> ArticleResult<Article> {
        self.owned_transition(caller, article_id, Transition::Delete).await
    }

    /// Trash back to draft; content is untouched.
    pub async fn restore(
        &self,
        caller: &CurrentUser,
        article_id: ArticleId,
    ) -> ArticleResult<Article> {
        self.owned_transition(caller, article_id, Transition::Restore).await
    }

    /// Moderation takedown of someone else's published article.
    pub async fn admin_unpublish(
        &self,
        caller: &CurrentUser,
        article_id: ArticleId,
    ) -> ArticleResult<Article> {
        require_admin(caller)?;
        let article = self
            .article_repo
            .find_by_id(article_id)
            .await?
            .ok_or(ArticleError::NotFound)?;
        self.apply(caller, article, Transition::Unpublish).await
    }

    /// Physical removal in any status, together with the article's views
    /// and claps.
    pub async fn hard_delete(
        &self,
        caller: &CurrentUser,
        article_id: ArticleId,
    ) -> ArticleResult<()> {
        require_admin(caller)?;
        if !self.article_repo.hard_delete(article_id).await? {
            return Err(ArticleError::NotFound);
        }

        tracing::info!(article_id = %article_id, user_id = %caller.user_id, "Article hard deleted");
        Ok(())
    }

    async fn owned_transition(
        &self,
        caller: &CurrentUser,
        article_id: ArticleId,
        transition: Transition,
    ) -> ArticleResult<Article> {
        let article = load_for_caller(self.article_repo.as_ref(), caller, article_id).await?;
        self.apply(caller, article, transition).await
    }

    async fn apply(
        &self,
        caller: &CurrentUser,
        mut article: Article,
        transition: Transition,
    ) -> ArticleResult<Article> {
        let previous = article.apply(transition, Utc::now())?;

        if transition == Transition::Publish {
            let pending = unapproved_tags(self.tag_repo.as_ref(), &article.tags).await?;
            if !pending.is_empty() {
                tracing::debug!(
                    article_id = %article.article_id,
                    tags = ?pending,
                    "Publish blocked by tags"
                );
                return Err(ArticleError::UnapprovedTags(pending));
            }
        }

        if !self.article_repo.transition(&article, previous).await? {
            let current = self
                .article_repo
                .find_by_id(article.article_id)
                .await?
                .ok_or(ArticleError::NotFound)?;
            tracing::debug!(
                article_id = %article.article_id,
                transition = transition.name(),
                status = current.status.code(),
                "Lost status race"
            );
            transition.target(current.status)?;
            return Err(ArticleError::Conflict);
        }
        article.version += 1;

        tracing::info!(
            article_id = %article.article_id,
            user_id = %caller.user_id,
            transition = transition.name(),
            status = article.status.code(),
            "Article status changed"
        );
        Ok(article)
    }
}
