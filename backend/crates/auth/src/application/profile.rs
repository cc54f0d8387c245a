//! Profile Use Cases
//!
//! Self-service operations on the caller's own account.

use std::sync::Arc;

use kernel::id::{ArticleId, UserId};

use crate::domain::entity::User;
use crate::domain::entity::user::{MAX_BIO_LENGTH, MAX_IMAGE_URL_LENGTH};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_name::UserName;
use crate::error::{AuthError, AuthResult};

/// Partial profile update. `Some("")` clears a field.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub bio: Option<String>,
    pub profile_image: Option<String>,
}

pub struct ProfileUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> ProfileUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn get_me(&self, user_id: UserId) -> AuthResult<User> {
        self.load(user_id).await
    }

    pub async fn update_profile(
        &self,
        user_id: UserId,
        changes: ProfileChanges,
    ) -> AuthResult<User> {
        let mut user = self.load(user_id).await?;

        if let Some(bio) = changes.bio {
            let bio = bio.trim();
            if bio.chars().count() > MAX_BIO_LENGTH {
                return Err(AuthError::InvalidInput(format!(
                    "bio must be at most {} characters",
                    MAX_BIO_LENGTH
                )));
            }
            user.bio = (!bio.is_empty()).then(|| bio.to_string());
        }
        if let Some(image) = changes.profile_image {
            let image = image.trim();
            if image.len() > MAX_IMAGE_URL_LENGTH {
                return Err(AuthError::InvalidInput(format!(
                    "profile image URL must be at most {} bytes",
                    MAX_IMAGE_URL_LENGTH
                )));
            }
            user.profile_image = (!image.is_empty()).then(|| image.to_string());
        }

        user.touch();
        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user_id, "Profile updated");
        Ok(user)
    }

    pub async fn update_user_name(&self, user_id: UserId, new_user_name: &str) -> AuthResult<User> {
        let new_user_name = UserName::new(new_user_name)?;
        let mut user = self.load(user_id).await?;
        if user.user_name == new_user_name {
            return Ok(user);
        }
        if self.user_repo.exists_by_user_name(&new_user_name).await? {
            return Err(AuthError::UsernameTaken);
        }

        user.user_name = new_user_name;
        user.touch();
        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user_id, user_name = %user.user_name, "User name changed");
        Ok(user)
    }

    pub async fn add_bookmark(&self, user_id: UserId, article_id: ArticleId) -> AuthResult<()> {
        if !self.user_repo.add_bookmark(user_id, article_id).await? {
            return Err(AuthError::UserNotFound);
        }
        tracing::debug!(user_id = %user_id, article_id = %article_id, "Bookmark added");
        Ok(())
    }

    pub async fn remove_bookmark(&self, user_id: UserId, article_id: ArticleId) -> AuthResult<()> {
        if !self.user_repo.remove_bookmark(user_id, article_id).await? {
            return Err(AuthError::UserNotFound);
        }
        tracing::debug!(user_id = %user_id, article_id = %article_id, "Bookmark removed");
        Ok(())
    }

    async fn load(&self, user_id: UserId) -> AuthResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
