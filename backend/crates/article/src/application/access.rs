//! Caller checks shared by the article use cases.
//!
//! A caller who may not touch an article sees `NotFound`, exactly like a
//! missing id. The log line keeps the two apart.

use kernel::CurrentUser;
use kernel::id::ArticleId;

use crate::domain::entity::Article;
use crate::domain::repository::ArticleRepository;
use crate::error::{ArticleError, ArticleResult};

/// Load an article the caller is allowed to mutate (author or admin).
pub(crate) async fn load_for_caller<A>(
    repo: &A,
    caller: &CurrentUser,
    article_id: ArticleId,
) -> ArticleResult<Article>
where
    A: ArticleRepository,
{
    let Some(article) = repo.find_by_id(article_id).await? else {
        tracing::debug!(article_id = %article_id, reason = "missing", "Article not found");
        return Err(ArticleError::NotFound);
    };
    if !caller.can_act_on(article.author_id) {
        tracing::warn!(
            article_id = %article_id,
            user_id = %caller.user_id,
            reason = "not_owner",
            "Article access denied"
        );
        return Err(ArticleError::NotFound);
    }
    Ok(article)
}

pub(crate) fn require_admin(caller: &CurrentUser) -> ArticleResult<()> {
    if caller.is_admin() {
        Ok(())
    } else {
        tracing::warn!(user_id = %caller.user_id, "Admin-only article operation denied");
        Err(ArticleError::Forbidden)
    }
}
