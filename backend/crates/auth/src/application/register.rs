//! Register Use Case
//!
//! Creates an unverified account and mails a verification link.

use std::sync::Arc;

use kernel::id::UserId;
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::mail;
use crate::domain::entity::{EmailToken, EmailTokenKind, EmailTokenPurpose, User};
use crate::domain::mailer::Mailer;
use crate::domain::repository::{EmailTokenRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult};

pub struct RegisterInput {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

pub struct RegisterOutput {
    pub user_id: UserId,
}

pub struct RegisterUseCase<U, E, M>
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

impl<U, E, M> RegisterUseCase<U, E, M>
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

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        let user_name = UserName::new(&input.user_name)?;
        let email = Email::new(input.email)?;
        let password = ClearTextPassword::new_strong(input.password)?;

        // Pre-checks give domain errors; the unique indexes still decide races.
        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }
        if self.user_repo.exists_by_user_name(&user_name).await? {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = self.config.password_service().hash_async(password).await?;
        let user = User::new(user_name, email, password_hash);
        self.user_repo.create(&user).await?;

        let (token, plaintext) = EmailToken::issue(
            user.user_id,
            EmailTokenPurpose::Verify,
            self.config.verification_ttl,
        );
        self.token_repo.create(&token).await?;

        let outgoing = mail::verification(&self.config, &user.email, &plaintext);
        if let Err(e) = self.mailer.send(outgoing).await {
            // Roll back so the address can register again.
            self.token_repo.delete_all_for_user(user.user_id).await?;
            self.user_repo.delete(user.user_id).await?;
            return Err(e.into());
        }

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            "User registered"
        );

        Ok(RegisterOutput {
            user_id: user.user_id,
        })
    }
}

/// Resend Verification Use Case
///
/// Always succeeds from the caller's point of view so that it cannot be used to
/// discover which addresses are registered.
pub struct ResendVerificationUseCase<U, E, M>
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

impl<U, E, M> ResendVerificationUseCase<U, E, M>
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

    pub async fn execute(&self, email: &str) -> AuthResult<()> {
        let email = Email::new(email)?;
        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            tracing::debug!("Verification resend for unknown address");
            return Ok(());
        };
        if user.is_verified {
            return Ok(());
        }

        self.token_repo
            .delete_for_user(user.user_id, EmailTokenKind::Verify)
            .await?;
        let (token, plaintext) = EmailToken::issue(
            user.user_id,
            EmailTokenPurpose::Verify,
            self.config.verification_ttl,
        );
        self.token_repo.create(&token).await?;

        let outgoing = mail::verification(&self.config, &user.email, &plaintext);
        if let Err(e) = self.mailer.send(outgoing).await {
            tracing::error!(user_id = %user.user_id, error = %e, "Verification resend failed");
            return Ok(());
        }

        tracing::info!(user_id = %user.user_id, "Verification email re-sent");
        Ok(())
    }
}
