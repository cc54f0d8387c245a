//! Trash Use Case
//!
//! Permanent removal of soft-deleted articles by their author. Removed
//! articles take their views and claps with them.

use std::sync::Arc;

use kernel::CurrentUser;
use kernel::id::ArticleId;

use crate::application::access::load_for_caller;
use crate::domain::entity::ArticleStatus;
use crate::domain::repository::ArticleRepository;
use crate::error::{ArticleError, ArticleResult};

/// Trash Use Case
pub struct TrashUseCase<A>
where
    A: ArticleRepository,
{
    article_repo: Arc<A>,
}

impl<A> TrashUseCase<A>
where
    A: ArticleRepository,
{
    pub fn new(article_repo: Arc<A>) -> Self {
        Self { article_repo }
    }

    /// Remove every deleted article of the caller. Returns how many went.
    pub async fn empty(&self, caller: &CurrentUser) -> ArticleResult<usize> {
        let removed = self.article_repo.empty_trash(caller.user_id).await?;

        tracing::info!(user_id = %caller.user_id, removed = removed.len(), "Trash emptied");
        Ok(removed.len())
    }

    /// Remove one deleted article. Live articles are refused with
    /// `NotDeleted`.
    pub async fn delete_one(
        &self,
        caller: &CurrentUser,
        article_id: ArticleId,
    ) -> ArticleResult<()> {
        let article = load_for_caller(self.article_repo.as_ref(), caller, article_id).await?;
        if article.status != ArticleStatus::Deleted {
            return Err(ArticleError::NotDeleted);
        }
        if !self
            .article_repo
            .delete_from_trash(article_id, article.author_id)
            .await?
        {
            // Restored or removed since the read.
            return Err(ArticleError::NotFound);
        }

        tracing::info!(
            article_id = %article_id,
            user_id = %caller.user_id,
            "Article removed from trash"
        );
        Ok(())
    }
}
