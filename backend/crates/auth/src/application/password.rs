//! Password Use Cases
//!
//! Change (authenticated), forgot (mail a reset code) and reset (consume the
//! code). Every successful change revokes all refresh tokens of the user.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::UserId;
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::mail;
use crate::domain::entity::{EmailToken, EmailTokenKind, EmailTokenPurpose};
use crate::domain::mailer::Mailer;
use crate::domain::repository::{EmailTokenRepository, RefreshTokenRepository, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

pub struct ChangePasswordUseCase<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    user_repo: Arc<U>,
    refresh_repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<U, R> ChangePasswordUseCase<U, R>
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
        user_id: UserId,
        old_password: String,
        new_password: String,
    ) -> AuthResult<()> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let passwords = self.config.password_service();
        if !passwords
            .verify_async(user.password_hash.clone(), ClearTextPassword::new(old_password))
            .await
        {
            return Err(AuthError::InvalidCredentials);
        }

        let new_password = ClearTextPassword::new_strong(new_password)?;
        user.password_hash = passwords.hash_async(new_password).await?;
        user.touch();
        self.user_repo.update(&user).await?;

        let revoked = self
            .refresh_repo
            .revoke_all_for_user(user_id, Utc::now())
            .await?;

        tracing::info!(user_id = %user_id, sessions_revoked = revoked, "Password changed");
        Ok(())
    }
}

pub struct ForgotPasswordUseCase<U, E, M>
where
    U: UserRepository,
    E: EmailTokenRepository,
    M: Mailer,
{
    user_repo: Arc<U>,
    token_repo: Arc<E>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<U, E, M> ForgotPasswordUseCase<U, E, M>
where
    U: UserRepository,
    E: EmailTokenRepository,
    M: Mailer,
{
    pub fn new(
        user_repo: Arc<U>,
        token_repo: Arc<E>,
        mailer: Arc<M>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            mailer,
            config,
        }
    }

    /// Replies success whether or not the address belongs to a user.
    pub async fn execute(&self, email: &str) -> AuthResult<()> {
        let email = Email::new(email)?;
        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            tracing::debug!("Password reset requested for unknown address");
            return Ok(());
        };

        // Only the newest reset code stays valid.
        self.token_repo
            .delete_for_user(user.user_id, EmailTokenKind::PasswordReset)
            .await?;
        let (token, plaintext) = EmailToken::issue(
            user.user_id,
            EmailTokenPurpose::PasswordReset,
            self.config.password_reset_ttl,
        );
        self.token_repo.create(&token).await?;

        let outgoing = mail::password_reset(&self.config, &user.email, &plaintext);
        if let Err(e) = self.mailer.send(outgoing).await {
            tracing::error!(user_id = %user.user_id, error = %e, "Password reset mail failed");
            return Ok(());
        }

        tracing::info!(user_id = %user.user_id, "Password reset requested");
        Ok(())
    }
}

pub struct ResetPasswordUseCase<U, R, E>
where
    U: UserRepository,
    R: RefreshTokenRepository,
    E: EmailTokenRepository,
{
    user_repo: Arc<U>,
    refresh_repo: Arc<R>,
    token_repo: Arc<E>,
    config: Arc<AuthConfig>,
}

impl<U, R, E> ResetPasswordUseCase<U, R, E>
where
    U: UserRepository,
    R: RefreshTokenRepository,
    E: EmailTokenRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        refresh_repo: Arc<R>,
        token_repo: Arc<E>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            refresh_repo,
            token_repo,
            config,
        }
    }

    pub async fn execute(&self, token: &str, new_password: String) -> AuthResult<()> {
        // Checked before the token is consumed so a weak choice can be retried.
        let new_password = ClearTextPassword::new_strong(new_password)?;

        let token = self
            .token_repo
            .take(&EmailToken::digest(token), EmailTokenKind::PasswordReset)
            .await?
            .ok_or(AuthError::TokenInvalid)?;
        let now = Utc::now();
        if token.is_expired(now) {
            return Err(AuthError::TokenExpired);
        }

        let mut user = self
            .user_repo
            .find_by_id(token.user_id)
            .await?
            .ok_or(AuthError::UserGone)?;

        user.password_hash = self.config.password_service().hash_async(new_password).await?;
        user.touch();
        self.user_repo.update(&user).await?;

        let revoked = self.refresh_repo.revoke_all_for_user(user.user_id, now).await?;

        tracing::info!(user_id = %user.user_id, sessions_revoked = revoked, "Password reset");
        Ok(())
    }
}
