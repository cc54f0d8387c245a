//! Refresh Token Entity
//!
//! Persisted counterpart of a signed refresh token. Only the SHA-256 digest of
//! the token string is stored.

use chrono::{DateTime, Utc};
use kernel::id::{RefreshTokenId, UserId};
use platform::client::ClientMetadata;
use platform::crypto::sha256_hex;

#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub id: RefreshTokenId,
    pub user_id: UserId,
    pub token_hash: String,
    pub device: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    /// `revoked` implies `revoked_at` is set
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn new(
        user_id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
        client: &ClientMetadata,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RefreshTokenId::new(),
            user_id,
            token_hash: Self::digest(token),
            device: client.device.clone(),
            ip: client.ip_string(),
            user_agent: client.user_agent.clone(),
            revoked: false,
            revoked_at: None,
            expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Lookup key for a presented token string.
    pub fn digest(token: &str) -> String {
        sha256_hex(token.as_bytes())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn revoke(&mut self, now: DateTime<Utc>) {
        if !self.revoked {
            self.revoked = true;
            self.revoked_at = Some(now);
            self.updated_at = now;
        }
    }
}
