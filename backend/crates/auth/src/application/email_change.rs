//! Email Change Use Cases
//!
//! The email column only changes after the new address proves it receives
//! mail: `UpdateEmail` sends a code to the new address, `VerifyUpdateEmail`
//! consumes it.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::application::mail;
use crate::domain::entity::{EmailToken, EmailTokenKind, EmailTokenPurpose};
use crate::domain::mailer::Mailer;
use crate::domain::repository::{EmailTokenRepository, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

pub struct UpdateEmailUseCase<U, E, M>
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

impl<U, E, M> UpdateEmailUseCase<U, E, M>
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

    pub async fn execute(&self, user_id: UserId, new_email: &str) -> AuthResult<()> {
        let new_email = Email::new(new_email)?;
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.email == new_email {
            return Err(AuthError::InvalidInput(
                "new email is the same as the current one".to_string(),
            ));
        }
        if self.user_repo.exists_by_email(&new_email).await? {
            return Err(AuthError::EmailTaken);
        }

        // A newer request supersedes any pending change.
        self.token_repo
            .delete_for_user(user_id, EmailTokenKind::EmailChange)
            .await?;
        let (token, plaintext) = EmailToken::issue(
            user_id,
            EmailTokenPurpose::EmailChange {
                new_email: new_email.clone(),
            },
            self.config.email_change_ttl,
        );
        self.token_repo.create(&token).await?;

        let outgoing = mail::email_change(&self.config, &new_email, &plaintext);
        if let Err(e) = self.mailer.send(outgoing).await {
            self.token_repo
                .delete_for_user(user_id, EmailTokenKind::EmailChange)
                .await?;
            return Err(e.into());
        }

        tracing::info!(user_id = %user_id, "Email change requested");
        Ok(())
    }
}

pub struct VerifyUpdateEmailUseCase<U, E>
where
    U: UserRepository,
    E: EmailTokenRepository,
{
    user_repo: Arc<U>,
    token_repo: Arc<E>,
}

impl<U, E> VerifyUpdateEmailUseCase<U, E>
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
        let token = self
            .token_repo
            .take(&EmailToken::digest(token), EmailTokenKind::EmailChange)
            .await?
            .ok_or(AuthError::TokenInvalid)?;
        if token.is_expired(Utc::now()) {
            return Err(AuthError::TokenExpired);
        }
        let new_email = token
            .purpose
            .new_email()
            .cloned()
            .ok_or(AuthError::TokenInvalid)?;

        let mut user = self
            .user_repo
            .find_by_id(token.user_id)
            .await?
            .ok_or(AuthError::UserGone)?;

        // Someone may have claimed the address while the mail was in flight.
        if self.user_repo.exists_by_email(&new_email).await? {
            return Err(AuthError::EmailTaken);
        }

        user.email = new_email;
        // Receiving the code proves ownership of the new address.
        user.is_verified = true;
        user.touch();
        self.user_repo.update(&user).await.map_err(|e| match e {
            AuthError::UserNotFound => AuthError::UserGone,
            other => other,
        })?;

        tracing::info!(user_id = %user.user_id, "Email changed");
        Ok(())
    }
}
