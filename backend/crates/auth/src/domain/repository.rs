//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the infra layer.

use chrono::{DateTime, Utc};
use kernel::PageRequest;
use kernel::id::{ArticleId, RefreshTokenId, UserId};

use crate::domain::entity::{EmailToken, EmailTokenKind, RefreshToken, User};
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user. Unique violations surface as `EmailTaken` / `UsernameTaken`.
    async fn create(&self, user: &User) -> AuthResult<()>;

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool>;

    /// Write back every mutable column. `UserNotFound` if the row is gone.
    async fn update(&self, user: &User) -> AuthResult<()>;

    async fn delete(&self, user_id: UserId) -> AuthResult<bool>;

    /// Newest first
    async fn list(&self, page: &PageRequest) -> AuthResult<(Vec<User>, u64)>;

    /// Append unless already present. `false` if the user does not exist.
    async fn add_bookmark(&self, user_id: UserId, article_id: ArticleId) -> AuthResult<bool>;

    async fn remove_bookmark(&self, user_id: UserId, article_id: ArticleId) -> AuthResult<bool>;

    /// Delete users with `verified = false AND created_at < cutoff`
    async fn delete_unverified_before(&self, cutoff: DateTime<Utc>) -> AuthResult<u64>;
}

/// Refresh token repository trait
#[trait_variant::make(RefreshTokenRepository: Send)]
pub trait LocalRefreshTokenRepository {
    async fn create(&self, token: &RefreshToken) -> AuthResult<()>;

    /// Lookup by digest, including revoked and expired rows.
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>>;

    /// Compare-and-swap `revoked: false -> true`. `false` if already revoked.
    async fn revoke_if_active(&self, id: RefreshTokenId, now: DateTime<Utc>) -> AuthResult<bool>;

    async fn revoke_by_hash(&self, token_hash: &str, now: DateTime<Utc>) -> AuthResult<bool>;

    /// Revoke every unrevoked token of the user.
    async fn revoke_all_for_user(&self, user_id: UserId, now: DateTime<Utc>) -> AuthResult<u64>;

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;

    /// Delete tokens with `revoked = true AND revoked_at < cutoff`
    async fn delete_revoked_before(&self, cutoff: DateTime<Utc>) -> AuthResult<u64>;
}

/// Email token repository trait
#[trait_variant::make(EmailTokenRepository: Send)]
pub trait LocalEmailTokenRepository {
    async fn create(&self, token: &EmailToken) -> AuthResult<()>;

    /// Load and delete in one step, so a token is consumed at most once.
    /// Expired rows are returned too; the caller decides.
    async fn take(&self, token_hash: &str, kind: EmailTokenKind) -> AuthResult<Option<EmailToken>>;

    async fn delete_for_user(&self, user_id: UserId, kind: EmailTokenKind) -> AuthResult<u64>;

    async fn delete_all_for_user(&self, user_id: UserId) -> AuthResult<u64>;

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

/// One backing store serving every identity repository.
pub trait IdentityStore:
    UserRepository + RefreshTokenRepository + EmailTokenRepository + Send + Sync + 'static
{
}

impl<T> IdentityStore for T where
    T: UserRepository + RefreshTokenRepository + EmailTokenRepository + Send + Sync + 'static
{
}
