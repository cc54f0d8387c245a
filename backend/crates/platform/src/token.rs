//! Signed Token Service
//!
//! HS256 access and refresh tokens. Expiry is an absolute UTC timestamp in the
//! claims; validation runs with zero leeway.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
    errors::ErrorKind as JwtErrorKind,
};
use kernel::UserRole;
use kernel::id::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The only accepted signing algorithm.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Access token lifetime: 15 minutes
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;

/// Refresh token lifetime: 7 days
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token is malformed")]
    Malformed,
    #[error("Token signature is invalid")]
    BadSignature,
    #[error("Token has expired")]
    Expired,
    #[error("Token declares an unexpected signing algorithm")]
    WrongAlgorithm,
    #[error("Token signing failed")]
    Signing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by both token types. `role` is only present on access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    pub typ: TokenType,
    pub iat: i64,
    pub exp: i64,
    /// Unique per token so that two tokens minted in the same second differ.
    pub jti: Uuid,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}

/// An encoded token with its absolute expiry.
#[derive(Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"[REDACTED]")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl: Duration::seconds(ACCESS_TOKEN_TTL_SECS),
            refresh_ttl: Duration::seconds(REFRESH_TOKEN_TTL_SECS),
        }
    }

    pub fn with_ttls(mut self, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        self.access_ttl = access_ttl;
        self.refresh_ttl = refresh_ttl;
        self
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn issue_access(&self, user_id: UserId, role: UserRole) -> Result<IssuedToken, TokenError> {
        self.issue_access_at(user_id, role, Utc::now())
    }

    pub fn issue_refresh(&self, user_id: UserId) -> Result<IssuedToken, TokenError> {
        self.issue_refresh_at(user_id, Utc::now())
    }

    pub fn issue_access_at(
        &self,
        user_id: UserId,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        self.sign(user_id, Some(role), TokenType::Access, now, self.access_ttl)
    }

    pub fn issue_refresh_at(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        self.sign(user_id, None, TokenType::Refresh, now, self.refresh_ttl)
    }

    pub fn validate_access(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.decode(token)?;
        if claims.typ != TokenType::Access || claims.role.is_none() {
            return Err(TokenError::Malformed);
        }
        Ok(claims)
    }

    pub fn validate_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.decode(token)?;
        if claims.typ != TokenType::Refresh {
            return Err(TokenError::Malformed);
        }
        Ok(claims)
    }

    fn sign(
        &self,
        user_id: UserId,
        role: Option<UserRole>,
        typ: TokenType,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = now + ttl;
        let claims = Claims {
            user_id,
            role,
            typ,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding)
            .map_err(|_| TokenError::Signing)?;
        Ok(IssuedToken { token, expires_at })
    }

    fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::Malformed)?;
        if header.alg != SIGNING_ALGORITHM {
            return Err(TokenError::WrongAlgorithm);
        }

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                JwtErrorKind::InvalidSignature => TokenError::BadSignature,
                JwtErrorKind::InvalidAlgorithm => TokenError::WrongAlgorithm,
                _ => TokenError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test-secret-with-enough-entropy")
    }

    #[test]
    fn test_access_roundtrip_carries_role() {
        let user_id = UserId::new();
        let issued = service().issue_access(user_id, UserRole::Admin).unwrap();
        let claims = service().validate_access(&issued.token).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.role, Some(UserRole::Admin));
        assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_TTL_SECS);
    }

    #[test]
    fn test_refresh_roundtrip() {
        let user_id = UserId::new();
        let issued = service().issue_refresh(user_id).unwrap();
        let claims = service().validate_refresh(&issued.token).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.role, None);
        assert_eq!(claims.exp - claims.iat, REFRESH_TOKEN_TTL_SECS);
    }

    #[test]
    fn test_tokens_minted_together_differ() {
        let user_id = UserId::new();
        let now = Utc::now();
        let a = service().issue_refresh_at(user_id, now).unwrap();
        let b = service().issue_refresh_at(user_id, now).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_types_are_not_interchangeable() {
        let user_id = UserId::new();
        let access = service().issue_access(user_id, UserRole::User).unwrap();
        let refresh = service().issue_refresh(user_id).unwrap();

        assert_eq!(
            service().validate_refresh(&access.token),
            Err(TokenError::Malformed)
        );
        assert_eq!(
            service().validate_access(&refresh.token),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_expired() {
        let past = Utc::now() - Duration::minutes(16);
        let issued = service()
            .issue_access_at(UserId::new(), UserRole::User, past)
            .unwrap();
        assert_eq!(
            service().validate_access(&issued.token),
            Err(TokenError::Expired)
        );

        let past = Utc::now() - Duration::days(8);
        let issued = service().issue_refresh_at(UserId::new(), past).unwrap();
        assert_eq!(
            service().validate_refresh(&issued.token),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_bad_signature() {
        let issued = TokenService::new(b"another-secret")
            .issue_access(UserId::new(), UserRole::User)
            .unwrap();
        assert_eq!(
            service().validate_access(&issued.token),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_wrong_algorithm() {
        let claims = Claims {
            user_id: UserId::new(),
            role: Some(UserRole::User),
            typ: TokenType::Access,
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
            jti: Uuid::new_v4(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret-with-enough-entropy"),
        )
        .unwrap();
        assert_eq!(
            service().validate_access(&token),
            Err(TokenError::WrongAlgorithm)
        );
    }

    #[test]
    fn test_malformed() {
        assert_eq!(
            service().validate_access("not.a.token"),
            Err(TokenError::Malformed)
        );
        assert_eq!(service().validate_access(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_issued_token_debug_is_redacted() {
        let issued = service().issue_refresh(UserId::new()).unwrap();
        assert!(!format!("{:?}", issued).contains(&issued.token));
    }
}
