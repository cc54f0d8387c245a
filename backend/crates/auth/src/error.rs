//! Auth Error Types
//!
//! Identity-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    WeakPassword(String),

    #[error("Email is already registered")]
    EmailTaken,

    #[error("User name is already taken")]
    UsernameTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email address has not been verified")]
    NotVerified,

    #[error("Account is disabled")]
    Disabled,

    #[error("Token is invalid")]
    TokenInvalid,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    TokenRevoked,

    /// The user a token points at no longer exists
    #[error("User no longer exists")]
    UserGone,

    #[error("User not found")]
    UserNotFound,

    /// Missing, malformed or expired access token
    #[error("Authentication required")]
    Unauthorized,

    /// Role not allowed for this operation
    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Failed to send email")]
    SendFailed,

    #[error("Too many requests")]
    RateLimited,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidInput(_) | AuthError::WeakPassword(_) => ErrorKind::BadRequest,
            AuthError::EmailTaken | AuthError::UsernameTaken => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::TokenInvalid
            | AuthError::TokenExpired
            | AuthError::TokenRevoked
            | AuthError::Unauthorized => ErrorKind::Unauthorized,
            AuthError::NotVerified | AuthError::Disabled | AuthError::Forbidden => {
                ErrorKind::Forbidden
            }
            AuthError::UserGone | AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::RateLimited => ErrorKind::TooManyRequests,
            AuthError::SendFailed => ErrorKind::BadGateway,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidInput(_) => "INVALID_INPUT",
            AuthError::WeakPassword(_) => "WEAK_PASSWORD",
            AuthError::EmailTaken => "EMAIL_TAKEN",
            AuthError::UsernameTaken => "USERNAME_TAKEN",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::NotVerified => "NOT_VERIFIED",
            AuthError::Disabled => "DISABLED",
            AuthError::TokenInvalid => "TOKEN_INVALID",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::TokenRevoked => "TOKEN_REVOKED",
            AuthError::UserGone => "USER_GONE",
            AuthError::UserNotFound => "NOT_FOUND",
            AuthError::Unauthorized => "UNAUTHORIZED",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::SendFailed => "SEND_FAILED",
            AuthError::RateLimited => "RATE_LIMITED",
            AuthError::Database(_) | AuthError::Internal(_) => "INTERNAL",
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::SendFailed => {
                tracing::error!("Outgoing mail could not be delivered");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::TokenRevoked => {
                tracing::warn!("Revoked refresh token presented");
            }
            AuthError::RateLimited => {
                tracing::warn!("Auth rate limit exceeded");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let code = err.code();
        let kind = err.kind();
        match err {
            AuthError::Database(e) => AppError::new(kind, "Database error")
                .with_code(code)
                .with_source(e),
            other => AppError::new(kind, other.to_string()).with_code(code),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

impl From<platform::password::PasswordHashError> for AuthError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<crate::domain::value_object::EmailError> for AuthError {
    fn from(err: crate::domain::value_object::EmailError) -> Self {
        AuthError::InvalidInput(err.to_string())
    }
}

impl From<crate::domain::value_object::UserNameError> for AuthError {
    fn from(err: crate::domain::value_object::UserNameError) -> Self {
        AuthError::InvalidInput(err.to_string())
    }
}

impl From<platform::password::PasswordPolicyError> for AuthError {
    fn from(err: platform::password::PasswordPolicyError) -> Self {
        AuthError::WeakPassword(err.to_string())
    }
}

impl From<crate::domain::mailer::MailError> for AuthError {
    fn from(err: crate::domain::mailer::MailError) -> Self {
        tracing::error!(error = %err, "Mail delivery failed");
        AuthError::SendFailed
    }
}

impl From<platform::token::TokenError> for AuthError {
    fn from(err: platform::token::TokenError) -> Self {
        use platform::token::TokenError;
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Signing => AuthError::Internal(err.to_string()),
            TokenError::Malformed | TokenError::BadSignature | TokenError::WrongAlgorithm => {
                AuthError::TokenInvalid
            }
        }
    }
}
