//! Identity Maintenance
//!
//! Batch deletions standing in for TTL indexes. Run periodically by the API
//! binary's reaper task.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::AuthConfig;
use crate::domain::repository::{EmailTokenRepository, RefreshTokenRepository, UserRepository};
use crate::error::AuthResult;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub unverified_users: u64,
    pub expired_refresh_tokens: u64,
    pub revoked_refresh_tokens: u64,
    pub expired_email_tokens: u64,
}

pub struct IdentityMaintenanceUseCase<U, R, E>
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

impl<U, R, E> IdentityMaintenanceUseCase<U, R, E>
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

    pub async fn run(&self, now: DateTime<Utc>) -> AuthResult<MaintenanceReport> {
        let report = MaintenanceReport {
            unverified_users: self
                .user_repo
                .delete_unverified_before(now - self.config.verification_ttl)
                .await?,
            expired_refresh_tokens: self.refresh_repo.delete_expired(now).await?,
            revoked_refresh_tokens: self
                .refresh_repo
                .delete_revoked_before(now - self.config.revoked_token_horizon)
                .await?,
            expired_email_tokens: self.token_repo.delete_expired(now).await?,
        };

        if report != MaintenanceReport::default() {
            tracing::info!(
                unverified_users = report.unverified_users,
                expired_refresh_tokens = report.expired_refresh_tokens,
                revoked_refresh_tokens = report.revoked_refresh_tokens,
                expired_email_tokens = report.expired_email_tokens,
                "Identity maintenance completed"
            );
        }
        Ok(report)
    }
}
