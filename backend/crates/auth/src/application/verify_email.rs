//! Verify Email Use Case
//!
//! Consumes a verification token (at most once) and marks the user verified.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::entity::{EmailToken, EmailTokenKind};
use crate::domain::repository::{EmailTokenRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

pub struct VerifyEmailUseCase<U, E>
where
    U: UserRepository,
    E: EmailTokenRepository,
{
    user_repo: Arc<U>,
    token_repo: Arc<E>,
}

impl<U, E> VerifyEmailUseCase<U, E>
where
    U: UserRepository,
    E: EmailTokenRepository,
{
    pub fn new(user_repo: Arc<U>, token_repo: Arc<E>) -> Self {
        Self {
            user_repo,
            token_repo,
        }
    }

    pub async fn execute(&self, token: &str) -> AuthResult<()> {
        if token.trim().is_empty() {
            return Err(AuthError::TokenInvalid);
        }

        let token = self
            .token_repo
            .take(&EmailToken::digest(token), EmailTokenKind::Verify)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        if token.is_expired(Utc::now()) {
            return Err(AuthError::TokenExpired);
        }

        let mut user = self
            .user_repo
            .find_by_id(token.user_id)
            .await?
            .ok_or(AuthError::UserGone)?;

        if !user.is_verified {
            user.is_verified = true;
            user.touch();
            self.user_repo.update(&user).await.map_err(|e| match e {
                AuthError::UserNotFound => AuthError::UserGone,
                other => other,
            })?;
        }

        tracing::info!(user_id = %user.user_id, "Email verified");
        Ok(())
    }
}
