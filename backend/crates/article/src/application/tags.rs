//! Tag Registry Use Cases
//!
//! Tags are created pending by any signed-in user and moderated by admins.
//! Articles may carry pending tags while drafted; publishing needs every tag
//! approved.

use std::sync::Arc;

use kernel::id::{TagId, UserId};
use kernel::{Page, PageRequest};

use crate::domain::entity::{Tag, TagStatus};
use crate::domain::repository::TagRepository;
use crate::domain::value_object::TagName;
use crate::error::{ArticleError, ArticleResult};

/// Tag Registry Use Case
pub struct TagUseCase<T>
where
    T: TagRepository,
{
    tag_repo: Arc<T>,
}

impl<T> TagUseCase<T>
where
    T: TagRepository,
{
    pub fn new(tag_repo: Arc<T>) -> Self {
        Self { tag_repo }
    }

    pub async fn create(&self, created_by: UserId, name: &str) -> ArticleResult<Tag> {
        let tag = Tag::new(TagName::new(name)?, created_by);
        self.tag_repo.create(&tag).await?;

        tracing::info!(
            tag_id = %tag.tag_id,
            tag = %tag.name,
            user_id = %created_by,
            "Tag proposed"
        );
        Ok(tag)
    }

    pub async fn approve(&self, tag_id: TagId) -> ArticleResult<Tag> {
        self.set_status(tag_id, TagStatus::Approved).await
    }

    pub async fn reject(&self, tag_id: TagId) -> ArticleResult<Tag> {
        self.set_status(tag_id, TagStatus::Rejected).await
    }

    pub async fn delete(&self, tag_id: TagId) -> ArticleResult<()> {
        if !self.tag_repo.delete(tag_id).await? {
            return Err(ArticleError::TagNotFound(tag_id.to_string()));
        }
        tracing::info!(tag_id = %tag_id, "Tag deleted");
        Ok(())
    }

    pub async fn list(
        &self,
        status: Option<TagStatus>,
        page: PageRequest,
    ) -> ArticleResult<Page<Tag>> {
        let (tags, total) = self.tag_repo.list(status, page).await?;
        Ok(Page::new(tags, total, page))
    }

    pub async fn is_approved(&self, name: &str) -> ArticleResult<bool> {
        let name = TagName::new(name)?;
        let found = self.tag_repo.find_by_names(std::slice::from_ref(&name)).await?;
        Ok(found.iter().any(Tag::is_approved))
    }

    /// Every name must resolve to a tag that is not rejected. Pending tags
    /// pass.
    pub async fn validate(&self, names: &[String]) -> ArticleResult<Vec<TagName>> {
        let names = TagName::normalize_all(names)?;
        let found = self.tag_repo.find_by_names(&names).await?;

        for name in &names {
            match found.iter().find(|tag| &tag.name == name) {
                None => return Err(ArticleError::TagNotFound(name.to_string())),
                Some(tag) if tag.status == TagStatus::Rejected => {
                    return Err(ArticleError::TagRejected(name.to_string()));
                }
                Some(_) => {}
            }
        }
        Ok(names)
    }

    async fn set_status(&self, tag_id: TagId, status: TagStatus) -> ArticleResult<Tag> {
        let tag = self
            .tag_repo
            .set_status(tag_id, status)
            .await?
            .ok_or_else(|| ArticleError::TagNotFound(tag_id.to_string()))?;

        tracing::info!(tag_id = %tag_id, tag = %tag.name, status = ?status, "Tag moderated");
        Ok(tag)
    }
}

/// Normalize the tags an author puts on an article: de-duplicated, capped,
/// and none of them rejected. Unknown and pending names are fine on drafts.
pub(crate) async fn prepare_article_tags<T>(
    tag_repo: &T,
    names: &[String],
    max_tags: usize,
) -> ArticleResult<Vec<TagName>>
where
    T: TagRepository,
{
    let names = TagName::normalize_all(names)?;
    if names.len() > max_tags {
        return Err(ArticleError::TagLimitExceeded(max_tags));
    }
    if names.is_empty() {
        return Ok(names);
    }

    let found = tag_repo.find_by_names(&names).await?;
    if let Some(rejected) = found.iter().find(|tag| tag.status == TagStatus::Rejected) {
        return Err(ArticleError::TagRejected(rejected.name.to_string()));
    }
    Ok(names)
}

/// Names on the article that do not resolve to an approved tag.
pub(crate) async fn unapproved_tags<T>(
    tag_repo: &T,
    names: &[TagName],
) -> ArticleResult<Vec<String>>
where
    T: TagRepository,
{
    if names.is_empty() {
        return Ok(Vec::new());
    }
    let found = tag_repo.find_by_names(names).await?;
    Ok(names
        .iter()
        .filter(|name| !found.iter().any(|tag| &tag.name == *name && tag.is_approved()))
        .map(ToString::to_string)
        .collect())
}
