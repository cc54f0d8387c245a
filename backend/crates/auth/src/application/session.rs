//! Refresh / Logout Use Cases
//!
//! Refresh rotates the presented token: the old row is revoked with a
//! compare-and-swap on `revoked = false`, and only a winning swap mints the new
//! pair. Two concurrent refreshes from the same parent cannot both succeed.

use std::sync::Arc;

use chrono::Utc;
use platform::client::ClientMetadata;

use crate::application::config::AuthConfig;
use crate::application::login::{SessionTokens, issue_session};
use crate::domain::entity::RefreshToken;
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

pub struct RefreshUseCase<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    user_repo: Arc<U>,
    refresh_repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<U, R> RefreshUseCase<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    pub fn new(user_repo: Arc<U>, refresh_repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            refresh_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        refresh_token: &str,
        client: ClientMetadata,
    ) -> AuthResult<SessionTokens> {
        let claims = self
            .config
            .token_service()
            .validate_refresh(refresh_token)
            .map_err(|e| {
                tracing::debug!(error = %e, "Refresh token rejected");
                AuthError::from(e)
            })?;

        let row = self
            .refresh_repo
            .find_by_hash(&RefreshToken::digest(refresh_token))
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        if row.user_id != claims.user_id {
            tracing::warn!(token_id = %row.id, "Refresh token subject mismatch");
            return Err(AuthError::TokenInvalid);
        }
        if row.revoked {
            tracing::warn!(
                user_id = %row.user_id,
                token_id = %row.id,
                "Revoked refresh token reused"
            );
            return Err(AuthError::TokenRevoked);
        }
        let now = Utc::now();
        if row.is_expired(now) {
            return Err(AuthError::TokenExpired);
        }

        let user = self
            .user_repo
            .find_by_id(row.user_id)
            .await?
            .ok_or(AuthError::TokenInvalid)?;
        if !user.is_active {
            return Err(AuthError::Disabled);
        }

        if !self.refresh_repo.revoke_if_active(row.id, now).await? {
            // Lost the race against another rotation or a logout.
            return Err(AuthError::TokenRevoked);
        }

        let tokens = issue_session(&self.config, self.refresh_repo.as_ref(), &user, &client).await?;

        tracing::info!(user_id = %user.user_id, parent_token_id = %row.id, "Refresh token rotated");
        Ok(tokens)
    }
}

pub struct LogoutUseCase<R>
where
    R: RefreshTokenRepository,
{
    refresh_repo: Arc<R>,
}

impl<R> LogoutUseCase<R>
where
    R: RefreshTokenRepository,
{
    pub fn new(refresh_repo: Arc<R>) -> Self {
        Self { refresh_repo }
    }

    /// Idempotent: unknown or already revoked tokens succeed silently.
    pub async fn execute(&self, refresh_token: &str) -> AuthResult<()> {
        let revoked = self
            .refresh_repo
            .revoke_by_hash(&RefreshToken::digest(refresh_token), Utc::now())
            .await?;
        if revoked {
            tracing::info!("User logged out");
        }
        Ok(())
    }
}
