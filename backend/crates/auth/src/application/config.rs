//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;

use chrono::Duration;
use platform::password::PasswordService;
use platform::token::{ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS, TokenService};

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for access / refresh tokens
    pub jwt_secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// Lifetime of email verification tokens; also the age after which
    /// unverified accounts are purged
    pub verification_ttl: Duration,
    pub password_reset_ttl: Duration,
    pub email_change_ttl: Duration,
    /// Revoked refresh tokens older than this are deleted
    pub revoked_token_horizon: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Argon2 (memory KiB, iterations) override; `None` keeps the defaults
    pub password_cost: Option<(u32, u32)>,
    /// Base URL used to build links in outgoing mail
    pub public_base_url: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("verification_ttl", &self.verification_ttl)
            .field("password_reset_ttl", &self.password_reset_ttl)
            .field("email_change_ttl", &self.email_change_ttl)
            .field("revoked_token_horizon", &self.revoked_token_horizon)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .field("public_base_url", &self.public_base_url)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Vec::new(),
            access_ttl: Duration::seconds(ACCESS_TOKEN_TTL_SECS),
            refresh_ttl: Duration::seconds(REFRESH_TOKEN_TTL_SECS),
            verification_ttl: Duration::hours(24),
            password_reset_ttl: Duration::hours(1),
            email_change_ttl: Duration::hours(24),
            revoked_token_horizon: Duration::days(30),
            password_pepper: None,
            password_cost: None,
            public_base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<Vec<u8>>, public_base_url: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            public_base_url: public_base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_pepper(mut self, pepper: Option<Vec<u8>>) -> Self {
        self.password_pepper = pepper;
        self
    }

    pub fn token_service(&self) -> TokenService {
        TokenService::new(&self.jwt_secret).with_ttls(self.access_ttl, self.refresh_ttl)
    }

    pub fn password_service(&self) -> PasswordService {
        let service = PasswordService::new(self.password_pepper.clone());
        match self.password_cost {
            Some((memory_kib, iterations)) => service.with_cost(memory_kib, iterations),
            None => service,
        }
    }

    /// Absolute link carried by outgoing mail
    pub fn link(&self, path: &str, token: &str) -> String {
        format!(
            "{}{}?code={}",
            self.public_base_url.trim_end_matches('/'),
            path,
            token
        )
    }
}
