//! Login Use Case
//!
//! Authenticates by email or user name and opens a refresh-token session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::client::ClientMetadata;
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::domain::entity::{RefreshToken, User};
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult};

pub struct LoginInput {
    /// Email if it contains '@', user name otherwise
    pub identifier: String,
    pub password: String,
}

/// Token pair handed to the client.
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry of the access token
    pub expires_at: DateTime<Utc>,
}

pub struct LoginOutput {
    pub tokens: SessionTokens,
    pub user: User,
}

pub struct LoginUseCase<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    user_repo: Arc<U>,
    refresh_repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<U, R> LoginUseCase<U, R>
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
        input: LoginInput,
        client: ClientMetadata,
    ) -> AuthResult<LoginOutput> {
        let identifier = input.identifier.trim();
        let user = if identifier.contains('@') {
            let email = Email::new(identifier).map_err(|_| AuthError::InvalidCredentials)?;
            self.user_repo.find_by_email(&email).await?
        } else {
            let user_name = UserName::new(identifier).map_err(|_| AuthError::InvalidCredentials)?;
            self.user_repo.find_by_user_name(&user_name).await?
        };
        let user = user.ok_or(AuthError::InvalidCredentials)?;

        let password = ClearTextPassword::new(input.password);
        let password_valid = self
            .config
            .password_service()
            .verify_async(user.password_hash.clone(), password)
            .await;
        if !password_valid {
            tracing::warn!(user_id = %user.user_id, "Password mismatch on login");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_verified {
            return Err(AuthError::NotVerified);
        }
        if !user.is_active {
            return Err(AuthError::Disabled);
        }

        let tokens = issue_session(
            &self.config,
            self.refresh_repo.as_ref(),
            &user,
            &client,
        )
        .await?;

        tracing::info!(
            user_id = %user.user_id,
            device = %client.device,
            "User logged in"
        );

        Ok(LoginOutput { tokens, user })
    }
}

/// Sign a fresh access + refresh pair and persist the refresh row.
pub(crate) async fn issue_session<R>(
    config: &AuthConfig,
    refresh_repo: &R,
    user: &User,
    client: &ClientMetadata,
) -> AuthResult<SessionTokens>
where
    R: RefreshTokenRepository,
{
    let tokens = config.token_service();
    let access = tokens.issue_access(user.user_id, user.role)?;
    let refresh = tokens.issue_refresh(user.user_id)?;

    let row = RefreshToken::new(user.user_id, &refresh.token, refresh.expires_at, client);
    refresh_repo.create(&row).await?;

    Ok(SessionTokens {
        access_token: access.token,
        refresh_token: refresh.token,
        expires_at: access.expires_at,
    })
}
